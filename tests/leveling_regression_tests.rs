//! Regression tests for the experience, unlock and favorite bookkeeping
//! at the store level.

use animewatch::config::Config;
use animewatch::db::{Store, UnlockOutcome};
use animewatch::models::{FavoriteAction, FavoriteOutcome, ProgressUpdate, WatchStatus};
use animewatch::services::leveling::LevelSnapshot;

async fn spawn_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("animewatch-reg-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.database.path = format!("sqlite:{}", db_path.display());

    let state = animewatch::api::create_app_state_from_config(config)
        .await
        .expect("failed to create app state");

    state.store().clone()
}

async fn seed_user(store: &Store, user_id: &str) {
    store
        .create_user_with_role(
            user_id,
            "regression-user",
            &format!("{user_id}@example.com"),
            "pw",
            &chrono::Utc::now().to_rfc3339(),
        )
        .await
        .expect("create user");
}

fn completion(user_id: &str, anime_id: &str, episodes: i32) -> ProgressUpdate {
    ProgressUpdate {
        user_id: user_id.to_string(),
        anime_id: anime_id.to_string(),
        title: Some("Regression Series".to_string()),
        image_url: None,
        status: WatchStatus::Completed,
        episodes_watched: episodes,
        total_episodes: Some(12),
    }
}

#[tokio::test]
async fn completion_cascade_credits_exp_exactly_once() {
    let store = spawn_store().await;
    seed_user(&store, "cascade-user").await;

    let stored = store
        .apply_watch_progress(&completion("cascade-user", "anime-1", 12))
        .await
        .expect("apply completion");
    assert_eq!(stored, WatchStatus::Completed);

    let snapshot = store
        .user_level_progress("cascade-user")
        .await
        .expect("level progress")
        .expect("user exists");
    assert_eq!(snapshot, LevelSnapshot { level: 1, exp: 100 });

    // An identical repeat is not a new watch event.
    store
        .apply_watch_progress(&completion("cascade-user", "anime-1", 12))
        .await
        .expect("repeat completion");
    let snapshot = store
        .user_level_progress("cascade-user")
        .await
        .expect("level progress")
        .expect("user exists");
    assert_eq!(snapshot, LevelSnapshot { level: 1, exp: 100 });

    // Episode growth past the stored count is.
    store
        .apply_watch_progress(&completion("cascade-user", "anime-1", 13))
        .await
        .expect("episode growth");
    let snapshot = store
        .user_level_progress("cascade-user")
        .await
        .expect("level progress")
        .expect("user exists");
    assert_eq!(snapshot, LevelSnapshot { level: 1, exp: 200 });

    // The recent marker stays unique per (user, anime).
    let recent = store
        .recent_for("cascade-user", 10)
        .await
        .expect("recent markers");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].anime_id, "anime-1");
}

#[tokio::test]
async fn unlock_credits_reward_once() {
    let store = spawn_store().await;
    seed_user(&store, "unlock-user").await;

    let achievement_id = store
        .create_achievement("Binge Starter", "Unlock test", None, 950)
        .await
        .expect("create achievement");

    let outcome = store
        .unlock_achievement("unlock-user", achievement_id)
        .await
        .expect("unlock");
    match outcome {
        UnlockOutcome::Unlocked { exp_gained, snapshot } => {
            assert_eq!(exp_gained, 950);
            assert_eq!(snapshot, LevelSnapshot { level: 1, exp: 950 });
        }
        other => panic!("expected Unlocked, got {other:?}"),
    }

    let outcome = store
        .unlock_achievement("unlock-user", achievement_id)
        .await
        .expect("second unlock");
    assert!(matches!(outcome, UnlockOutcome::AlreadyUnlocked));

    // The reward must not have been credited twice.
    let snapshot = store
        .user_level_progress("unlock-user")
        .await
        .expect("level progress")
        .expect("user exists");
    assert_eq!(snapshot, LevelSnapshot { level: 1, exp: 950 });

    let outcome = store
        .unlock_achievement("unlock-user", 9999)
        .await
        .expect("unknown achievement");
    assert!(matches!(outcome, UnlockOutcome::UnknownAchievement));
}

#[tokio::test]
async fn unlock_rolls_back_when_user_is_missing() {
    let store = spawn_store().await;

    let achievement_id = store
        .create_achievement("Orphan Unlock", "Rollback test", None, 100)
        .await
        .expect("create achievement");

    let outcome = store
        .unlock_achievement("late-user", achievement_id)
        .await
        .expect("unlock without user");
    assert!(matches!(outcome, UnlockOutcome::UnknownUser));

    // The unlock row written before the user check must not survive the
    // aborted transaction.
    seed_user(&store, "late-user").await;
    let unlocked = store
        .achievements_for_user("late-user")
        .await
        .expect("list unlocked");
    assert!(unlocked.is_empty());
}

#[tokio::test]
async fn single_step_and_rollover_award_paths_diverge() {
    let store = spawn_store().await;
    seed_user(&store, "step-user").await;
    seed_user(&store, "rollover-user").await;

    // Unlock rewards rise at most one level however large the reward.
    let achievement_id = store
        .create_achievement("Jackpot", "Oversized reward", None, 5000)
        .await
        .expect("create achievement");
    let outcome = store
        .unlock_achievement("step-user", achievement_id)
        .await
        .expect("unlock");
    match outcome {
        UnlockOutcome::Unlocked { snapshot, .. } => {
            assert_eq!(snapshot, LevelSnapshot { level: 2, exp: 5000 });
        }
        other => panic!("expected Unlocked, got {other:?}"),
    }

    // The watch-episode award subtracts each cleared threshold instead.
    let snapshot = store
        .award_episode_exp("rollover-user", 3300)
        .await
        .expect("award")
        .expect("user exists");
    assert_eq!(snapshot, LevelSnapshot { level: 3, exp: 300 });
}

#[tokio::test]
async fn favorite_toggle_reports_each_outcome() {
    let store = spawn_store().await;
    seed_user(&store, "fav-user").await;

    let outcome = store
        .toggle_favorite(
            "fav-user",
            FavoriteAction::Add,
            "anime-9",
            Some("Toggle Target"),
            None,
        )
        .await
        .expect("first add");
    assert_eq!(outcome, FavoriteOutcome::Added);

    let outcome = store
        .toggle_favorite(
            "fav-user",
            FavoriteAction::Add,
            "anime-9",
            Some("Toggle Target (updated)"),
            Some("/img/target.jpg"),
        )
        .await
        .expect("re-add");
    assert_eq!(outcome, FavoriteOutcome::Updated);

    let favorites = store.list_favorites("fav-user").await.expect("list");
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].title.as_deref(), Some("Toggle Target (updated)"));

    let outcome = store
        .toggle_favorite("fav-user", FavoriteAction::Remove, "anime-9", None, None)
        .await
        .expect("remove");
    assert_eq!(outcome, FavoriteOutcome::Removed);

    let outcome = store
        .toggle_favorite("fav-user", FavoriteAction::Remove, "anime-9", None, None)
        .await
        .expect("remove again");
    assert_eq!(outcome, FavoriteOutcome::Missing);

    assert_eq!(store.favorites_count("fav-user").await.expect("count"), 0);
}

#[tokio::test]
async fn profile_upsert_preserves_stored_email() {
    let store = spawn_store().await;
    seed_user(&store, "upsert-user").await;

    store
        .upsert_user_profile("upsert-user", "renamed", None)
        .await
        .expect("rename");
    let user = store
        .get_user("upsert-user")
        .await
        .expect("get user")
        .expect("user exists");
    assert_eq!(user.username, "renamed");
    assert_eq!(user.email, "upsert-user@example.com");

    // A fresh id gets a full row with registration defaults.
    store
        .upsert_user_profile("fresh-id", "ghost-profile", Some("Ghost@Example.com"))
        .await
        .expect("create via upsert");
    let user = store
        .get_user("fresh-id")
        .await
        .expect("get user")
        .expect("row created");
    assert_eq!(user.email, "ghost@example.com");
    assert_eq!(user.level, 1);
    assert_eq!(user.exp, 0);
    assert!(user.password.is_empty());
}

#[tokio::test]
async fn watch_status_write_keeps_total_untouched() {
    let store = spawn_store().await;
    seed_user(&store, "status-user").await;

    store
        .set_watch_status(
            "status-user",
            "anime-3",
            WatchStatus::Watching,
            4,
            "Status Target",
            "/img/status.jpg",
        )
        .await
        .expect("insert status");

    let rows = store
        .watch_progress_for("status-user")
        .await
        .expect("progress rows");
    assert_eq!(rows.len(), 1);
    // Inserts default the total to zero; updates leave it alone.
    assert_eq!(rows[0].total_episodes, Some(0));
    assert_eq!(
        store
            .count_with_status("status-user", WatchStatus::Watching)
            .await
            .expect("count"),
        1
    );

    store
        .set_watch_status(
            "status-user",
            "anime-3",
            WatchStatus::Completed,
            12,
            "Status Target",
            "/img/status.jpg",
        )
        .await
        .expect("update status");
    let rows = store
        .watch_progress_for("status-user")
        .await
        .expect("progress rows");
    assert_eq!(rows[0].episodes_watched, 12);
    assert_eq!(rows[0].total_episodes, Some(0));
    assert_eq!(
        store
            .count_with_status("status-user", WatchStatus::Watching)
            .await
            .expect("count"),
        0
    );

    store
        .delete_watch_status("status-user", "anime-3")
        .await
        .expect("delete");
    assert_eq!(
        store
            .count_with_status("status-user", WatchStatus::Completed)
            .await
            .expect("count"),
        0
    );
    // Deleting an absent pair is a no-op.
    store
        .delete_watch_status("status-user", "anime-3")
        .await
        .expect("repeat delete");
}

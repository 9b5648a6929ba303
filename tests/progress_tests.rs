//! Integration tests for the watch-progress endpoints.
//!
//! Covers the summary partitions, the lightweight status writes, watch
//! statistics and the experience awards hanging off progress updates.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use animewatch::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.database.path = "sqlite::memory:".to_string();
    // Every pooled connection to :memory: opens its own empty database, so
    // the test pool must stay at a single shared connection.
    config.database.max_connections = 1;
    config.database.min_connections = 1;
    config.media.avatars_path = std::env::temp_dir()
        .join(format!("animewatch-test-avatars-{}", uuid::Uuid::new_v4()))
        .display()
        .to_string();

    let state = animewatch::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    animewatch::api::router(state).await
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn register_user(app: &Router, username: &str, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "username={username}&email={email}&password=secret123"
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    body["user_id"].as_str().unwrap().to_string()
}

async fn report_progress(app: &Router, body: serde_json::Value) -> serde_json::Value {
    let response = send_json(app, "POST", "/watch-progress", &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await
}

#[tokio::test]
async fn test_watch_progress_validation() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "ritsuko", "ritsuko@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/watch-progress",
        &serde_json::json!({
            "user_id": user_id,
            "anime_id": "a-1",
            "status": "paused",
            "episodes_watched": 3
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Invalid status value");

    let response = send_json(
        &app,
        "POST",
        "/watch-progress",
        &serde_json::json!({
            "user_id": "ghost-user",
            "anime_id": "a-1",
            "status": "watching",
            "episodes_watched": 3
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown users read back the empty structure, not a 404.
    let response = get(&app, "/watch-progress/ghost-user").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["completed"].as_array().unwrap().len(), 0);
    assert_eq!(body["inProgress"].as_array().unwrap().len(), 0);
    assert_eq!(body["stats"]["totalEpisodesWatched"], 0);
    assert_eq!(body["stats"]["completed_count"], 0);
}

#[tokio::test]
async fn test_watch_progress_summary_partitions() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "maya", "maya@example.com").await;

    report_progress(
        &app,
        serde_json::json!({
            "user_id": user_id,
            "anime_id": "a-1",
            "title": "Frieren",
            "image_url": "/img/frieren.jpg",
            "status": "watching",
            "episodes_watched": 3,
            "total_episodes": 12
        }),
    )
    .await;
    report_progress(
        &app,
        serde_json::json!({
            "user_id": user_id,
            "anime_id": "a-2",
            "title": "K-On!",
            "status": "completed",
            "episodes_watched": 12,
            "total_episodes": 12
        }),
    )
    .await;

    let response = get(&app, &format!("/watch-progress/{user_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    let completed = body["completed"].as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["animeId"], "a-2");
    assert_eq!(completed[0]["episodes"], 12);
    assert_eq!(completed[0]["rating"], 0);
    assert_eq!(completed[0]["image_url"], "/placeholder.svg");
    assert!(completed[0]["completedAt"].as_str().is_some());

    let in_progress = body["inProgress"].as_array().unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0]["animeId"], "a-1");
    assert_eq!(in_progress[0]["currentEpisode"], 3);
    assert_eq!(in_progress[0]["episodes"], 12);
    assert_eq!(in_progress[0]["status"], "watching");
    assert!(in_progress[0]["lastWatched"].as_str().is_some());

    assert_eq!(body["stats"]["totalEpisodesWatched"], 15);
    // 24 minutes per episode, reported in seconds of minutes watched.
    assert_eq!(body["stats"]["totalTimeSpent"], 15 * 24 * 60);
    assert_eq!(body["stats"]["averageRating"], 0);
    assert_eq!(body["stats"]["completed_count"], 1);
    assert_eq!(body["stats"]["watching_count"], 1);
}

#[tokio::test]
async fn test_total_episodes_reached_forces_completed() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "kensuke", "kensuke@example.com").await;

    let body = report_progress(
        &app,
        serde_json::json!({
            "user_id": user_id,
            "anime_id": "a-3",
            "title": "Planetes",
            "status": "watching",
            "episodes_watched": 26,
            "total_episodes": 26
        }),
    )
    .await;
    assert_eq!(body["message"], "Progress updated successfully");
    assert_eq!(body["status"], "completed");

    // A zero total never forces completion.
    let body = report_progress(
        &app,
        serde_json::json!({
            "user_id": user_id,
            "anime_id": "a-4",
            "title": "Ongoing",
            "status": "watching",
            "episodes_watched": 7,
            "total_episodes": 0
        }),
    )
    .await;
    assert_eq!(body["status"], "watching");
}

#[tokio::test]
async fn test_watch_event_cascade_awards_once() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "kozo", "kozo@example.com").await;

    let completion = serde_json::json!({
        "user_id": user_id,
        "anime_id": "a-5",
        "title": "Haibane Renmei",
        "status": "completed",
        "episodes_watched": 13,
        "total_episodes": 13
    });

    report_progress(&app, completion.clone()).await;
    let progress = read_json(get(&app, &format!("/user/{user_id}/progress")).await).await;
    assert_eq!(progress["exp"], 100);

    // Re-reporting the identical state must not credit again.
    report_progress(&app, completion).await;
    let progress = read_json(get(&app, &format!("/user/{user_id}/progress")).await).await;
    assert_eq!(progress["exp"], 100);

    // Episode growth past the stored count does.
    report_progress(
        &app,
        serde_json::json!({
            "user_id": user_id,
            "anime_id": "a-5",
            "title": "Haibane Renmei",
            "status": "completed",
            "episodes_watched": 14,
            "total_episodes": 13
        }),
    )
    .await;
    let progress = read_json(get(&app, &format!("/user/{user_id}/progress")).await).await;
    assert_eq!(progress["exp"], 200);

    // The cascade keeps exactly one recent marker per anime.
    let recent = read_json(get(&app, &format!("/recent/{user_id}")).await).await;
    assert_eq!(recent.as_array().unwrap().len(), 1);
    assert_eq!(recent[0]["anime_id"], "a-5");
}

#[tokio::test]
async fn test_watch_status_endpoint_and_quick_stats() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "makoto", "makoto@example.com").await;

    let response = send_json(
        &app,
        "POST",
        &format!("/watch-status/{user_id}"),
        &serde_json::json!({ "animeId": "b-1", "status": "watching", "episodes": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Title and image_url are required");

    let response = send_json(
        &app,
        "POST",
        &format!("/watch-status/{user_id}"),
        &serde_json::json!({
            "animeId": "b-1",
            "status": "on-hold",
            "title": "T",
            "image_url": "/i.jpg"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = send_json(
        &app,
        "POST",
        &format!("/watch-status/{user_id}"),
        &serde_json::json!({
            "animeId": "b-1",
            "status": "watching",
            "episodes": 4,
            "title": "Hyouka",
            "image_url": "/img/hyouka.jpg"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["watched_count"], 0);
    assert_eq!(body["in_progress_count"], 1);

    let response = send_json(
        &app,
        "POST",
        &format!("/watch-status/{user_id}"),
        &serde_json::json!({
            "animeId": "b-2",
            "status": "completed",
            "episodes": 22,
            "title": "Hyouka S2",
            "image_url": "/img/hyouka2.jpg"
        }),
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["watched_count"], 1);
    assert_eq!(body["in_progress_count"], 1);

    let stats = read_json(get(&app, &format!("/stats/{user_id}")).await).await;
    assert_eq!(stats["favorites_count"], 0);
    assert_eq!(stats["watched_count"], 1);
    assert_eq!(stats["in_progress_count"], 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/watch-status/{user_id}/b-1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "deleted");

    let stats = read_json(get(&app, &format!("/stats/{user_id}")).await).await;
    assert_eq!(stats["in_progress_count"], 0);
}

#[tokio::test]
async fn test_watched_lists_and_placeholder() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "yui", "yui@example.com").await;

    report_progress(
        &app,
        serde_json::json!({
            "user_id": user_id,
            "anime_id": "c-1",
            "title": "Texhnolyze",
            "status": "completed",
            "episodes_watched": 22
        }),
    )
    .await;

    // The card list substitutes the placeholder for missing artwork.
    let list = read_json(get(&app, &format!("/watched-list/{user_id}")).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["animeId"], "c-1");
    assert_eq!(list[0]["image_url"], "/placeholder.svg");
    assert!(list[0]["total_episodes"].is_null());

    // The minimal list reports the stored value as-is.
    let list = read_json(get(&app, &format!("/watched/{user_id}")).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["anime_id"], "c-1");
    assert!(list[0]["image_url"].is_null());
}

#[tokio::test]
async fn test_user_stats_counts_all_statuses() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "fuyutsuki", "fuyutsuki@example.com").await;

    for (anime_id, status, episodes) in [
        ("d-1", "planned", 0),
        ("d-2", "watching", 5),
        ("d-3", "completed", 12),
        ("d-4", "dropped", 2),
    ] {
        report_progress(
            &app,
            serde_json::json!({
                "user_id": user_id,
                "anime_id": anime_id,
                "title": anime_id,
                "status": status,
                "episodes_watched": episodes
            }),
        )
        .await;
    }

    let stats = read_json(get(&app, &format!("/user-stats/{user_id}")).await).await;
    assert_eq!(stats["completed_anime"], 1);
    assert_eq!(stats["watching_anime"], 1);
    assert_eq!(stats["planned_anime"], 1);
    assert_eq!(stats["dropped_anime"], 1);
    assert_eq!(stats["total_episodes_watched"], 19);
}

#[tokio::test]
async fn test_global_watched_aggregates_users() {
    let app = spawn_app().await;
    let first = register_user(&app, "user-one", "one@example.com").await;
    let second = register_user(&app, "user-two", "two@example.com").await;

    for user_id in [&first, &second] {
        report_progress(
            &app,
            serde_json::json!({
                "user_id": user_id,
                "anime_id": "g-1",
                "title": "Global Hit",
                "status": "completed",
                "episodes_watched": 12
            }),
        )
        .await;
    }
    report_progress(
        &app,
        serde_json::json!({
            "user_id": first,
            "anime_id": "g-2",
            "title": "Niche Pick",
            "status": "completed",
            "episodes_watched": 6
        }),
    )
    .await;

    let list = read_json(get(&app, "/watched-anime/global").await).await;
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["anime_id"], "g-1");
    assert_eq!(items[0]["watch_count"], 2);
    assert_eq!(items[1]["watch_count"], 1);

    let list = read_json(get(&app, "/watched-anime/global?limit=1").await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_watched_detailed_flags_favorites() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "sakura", "sakura@example.com").await;

    for anime_id in ["e-1", "e-2"] {
        report_progress(
            &app,
            serde_json::json!({
                "user_id": user_id,
                "anime_id": anime_id,
                "title": anime_id,
                "status": "completed",
                "episodes_watched": 12
            }),
        )
        .await;
    }
    let response = send_json(
        &app,
        "POST",
        &format!("/favorites/{user_id}"),
        &serde_json::json!({ "animeId": "e-1", "action": "add", "title": "e-1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let list = read_json(get(&app, &format!("/user/{user_id}/watched-detailed")).await).await;
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 2);
    let favorite = items.iter().find(|i| i["anime_id"] == "e-1").unwrap();
    let other = items.iter().find(|i| i["anime_id"] == "e-2").unwrap();
    assert_eq!(favorite["is_favorite"], true);
    assert_eq!(other["is_favorite"], false);
    assert_eq!(favorite["episodes_watched"], 12);
    assert_eq!(favorite["status"], "completed");
}

#[tokio::test]
async fn test_level_progress_and_watch_episode() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "grinder", "grinder@example.com").await;

    let progress = read_json(get(&app, &format!("/user/{user_id}/progress")).await).await;
    assert_eq!(progress["level"], 1);
    assert_eq!(progress["exp"], 0);
    assert_eq!(progress["next_level_exp"], 1000);

    // Ten first-time completions credit 100 exp each; the tenth crosses
    // the level-1 threshold without losing the accumulated total.
    for n in 0..10 {
        report_progress(
            &app,
            serde_json::json!({
                "user_id": user_id,
                "anime_id": format!("lv-{n}"),
                "title": format!("Series {n}"),
                "status": "completed",
                "episodes_watched": 12
            }),
        )
        .await;
    }
    let progress = read_json(get(&app, &format!("/user/{user_id}/progress")).await).await;
    assert_eq!(progress["level"], 2);
    assert_eq!(progress["exp"], 1000);
    assert_eq!(progress["next_level_exp"], 2000);

    // The watch-episode action rolls exp over instead; from level 2 the
    // extra 100 stays below the next threshold.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/user/{user_id}/watch-episode"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let progress = read_json(response).await;
    assert_eq!(progress["level"], 2);
    assert_eq!(progress["exp"], 1100);
    assert_eq!(progress["next_level_exp"], 2000);

    let fresh = register_user(&app, "starter", "starter@example.com").await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/user/{fresh}/watch-episode"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let progress = read_json(response).await;
    assert_eq!(progress["level"], 1);
    assert_eq!(progress["exp"], 100);

    let response = get(&app, "/user/ghost-user/progress").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/user/ghost-user/watch-episode")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_episode_progress_upsert() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "binge", "binge@example.com").await;

    let payload = serde_json::json!({
        "user_id": user_id,
        "anime_id": "ep-1",
        "episode_number": 3,
        "progress": 0.25
    });
    let response = send_json(&app, "POST", "/episode-progress", &payload).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Episode progress updated");

    // Re-reporting the same episode replaces the stored position.
    let payload = serde_json::json!({
        "user_id": user_id,
        "anime_id": "ep-1",
        "episode_number": 3,
        "progress": 0.8
    });
    let response = send_json(&app, "POST", "/episode-progress", &payload).await;
    assert_eq!(response.status(), StatusCode::OK);
}

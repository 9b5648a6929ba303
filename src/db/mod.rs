use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{
    achievements, favorites, news, now_watching, recent, reviews, users, watch_progress,
};
use crate::models::{FavoriteAction, FavoriteOutcome, ProgressUpdate, WatchStatus};
use crate::services::leveling::LevelSnapshot;

pub mod migrator;
pub mod repositories;

pub use repositories::achievements::{UnlockOutcome, UnlockedAchievementRow};
pub use repositories::admin::AdminUserRow;
pub use repositories::favorites::FavoriteDetailedRow;
pub use repositories::progress::{GlobalWatchedRow, UserWatchStats, WatchedDetailedRow};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn progress_repo(&self) -> repositories::progress::ProgressRepository {
        repositories::progress::ProgressRepository::new(self.conn.clone())
    }

    fn favorites_repo(&self) -> repositories::favorites::FavoritesRepository {
        repositories::favorites::FavoritesRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    fn achievement_repo(&self) -> repositories::achievements::AchievementRepository {
        repositories::achievements::AchievementRepository::new(self.conn.clone())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    fn news_repo(&self) -> repositories::news::NewsRepository {
        repositories::news::NewsRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user(&self, user_id: &str) -> Result<Option<users::Model>> {
        self.user_repo().get(user_id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn user_exists(&self, user_id: &str) -> Result<bool> {
        self.user_repo().exists(user_id).await
    }

    pub async fn create_user_with_role(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        password: &str,
        created_at: &str,
    ) -> Result<()> {
        self.user_repo()
            .create_with_role(user_id, username, email, password, created_at)
            .await
    }

    pub async fn upsert_user_profile(
        &self,
        user_id: &str,
        username: &str,
        email: Option<&str>,
    ) -> Result<()> {
        self.user_repo()
            .upsert_profile(user_id, username, email)
            .await
    }

    pub async fn update_user_profile(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        avatar_path: Option<&str>,
    ) -> Result<u64> {
        self.user_repo()
            .update_profile(user_id, username, email, avatar_path)
            .await
    }

    pub async fn set_avatar_path(&self, user_id: &str, avatar_path: &str) -> Result<u64> {
        self.user_repo().set_avatar_path(user_id, avatar_path).await
    }

    pub async fn avatar_path(&self, user_id: &str) -> Result<Option<String>> {
        self.user_repo().avatar_path(user_id).await
    }

    pub async fn user_level_progress(&self, user_id: &str) -> Result<Option<LevelSnapshot>> {
        self.user_repo().level_progress(user_id).await
    }

    pub async fn award_episode_exp(
        &self,
        user_id: &str,
        award: i32,
    ) -> Result<Option<LevelSnapshot>> {
        self.user_repo().award_episode_exp(user_id, award).await
    }

    pub async fn list_users(&self) -> Result<Vec<users::Model>> {
        self.user_repo().list_all().await
    }

    // Watch progress

    pub async fn apply_watch_progress(&self, update: &ProgressUpdate) -> Result<WatchStatus> {
        self.progress_repo().apply_update(update).await
    }

    pub async fn watch_progress_for(&self, user_id: &str) -> Result<Vec<watch_progress::Model>> {
        self.progress_repo().rows_for_user(user_id).await
    }

    pub async fn completed_for(&self, user_id: &str) -> Result<Vec<watch_progress::Model>> {
        self.progress_repo().completed_rows(user_id).await
    }

    pub async fn set_watch_status(
        &self,
        user_id: &str,
        anime_id: &str,
        status: WatchStatus,
        episodes_watched: i32,
        title: &str,
        image_url: &str,
    ) -> Result<()> {
        self.progress_repo()
            .set_status(user_id, anime_id, status, episodes_watched, title, image_url)
            .await
    }

    pub async fn delete_watch_status(&self, user_id: &str, anime_id: &str) -> Result<()> {
        self.progress_repo().delete_status(user_id, anime_id).await
    }

    pub async fn count_with_status(&self, user_id: &str, status: WatchStatus) -> Result<u64> {
        self.progress_repo().count_with_status(user_id, status).await
    }

    pub async fn user_watch_stats(&self, user_id: &str) -> Result<UserWatchStats> {
        self.progress_repo().stats_for_user(user_id).await
    }

    pub async fn global_watched(&self, limit: u64) -> Result<Vec<GlobalWatchedRow>> {
        self.progress_repo().global_watched(limit).await
    }

    pub async fn watched_detailed(&self, user_id: &str) -> Result<Vec<WatchedDetailedRow>> {
        self.progress_repo().watched_detailed(user_id).await
    }

    pub async fn upsert_episode_progress(
        &self,
        user_id: &str,
        anime_id: &str,
        episode_number: i32,
        progress: f64,
    ) -> Result<()> {
        self.progress_repo()
            .upsert_episode_progress(user_id, anime_id, episode_number, progress)
            .await
    }

    // Favorites

    pub async fn toggle_favorite(
        &self,
        user_id: &str,
        action: FavoriteAction,
        anime_id: &str,
        title: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<FavoriteOutcome> {
        self.favorites_repo()
            .toggle(user_id, action, anime_id, title, image_url)
            .await
    }

    pub async fn list_favorites(&self, user_id: &str) -> Result<Vec<favorites::Model>> {
        self.favorites_repo().list(user_id).await
    }

    pub async fn favorites_count(&self, user_id: &str) -> Result<u64> {
        self.favorites_repo().count(user_id).await
    }

    pub async fn favorites_detailed(&self, user_id: &str) -> Result<Vec<FavoriteDetailedRow>> {
        self.favorites_repo().detailed(user_id).await
    }

    // Activity

    pub async fn recent_for(&self, user_id: &str, limit: u64) -> Result<Vec<recent::Model>> {
        self.activity_repo().recent_for(user_id, limit).await
    }

    pub async fn push_recent(
        &self,
        user_id: &str,
        anime_id: &str,
        title: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<()> {
        self.activity_repo()
            .push_recent(user_id, anime_id, title, image_url)
            .await
    }

    pub async fn set_now_watching(
        &self,
        anime_id: &str,
        title: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<()> {
        self.activity_repo()
            .set_now_watching(anime_id, title, image_url)
            .await
    }

    pub async fn now_watching(&self, limit: u64) -> Result<Vec<now_watching::Model>> {
        self.activity_repo().now_watching(limit).await
    }

    // Achievements

    pub async fn create_achievement(
        &self,
        name: &str,
        description: &str,
        icon_path: Option<&str>,
        exp_reward: i32,
    ) -> Result<i32> {
        self.achievement_repo()
            .create(name, description, icon_path, exp_reward)
            .await
    }

    pub async fn list_achievements(&self) -> Result<Vec<achievements::Model>> {
        self.achievement_repo().list().await
    }

    pub async fn get_achievement(&self, achievement_id: i32) -> Result<Option<achievements::Model>> {
        self.achievement_repo().get(achievement_id).await
    }

    pub async fn achievements_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<UnlockedAchievementRow>> {
        self.achievement_repo().for_user(user_id).await
    }

    pub async fn unlock_achievement(
        &self,
        user_id: &str,
        achievement_id: i32,
    ) -> Result<UnlockOutcome> {
        self.achievement_repo().unlock(user_id, achievement_id).await
    }

    // Roles & administrators

    pub async fn role_of(&self, user_id: &str) -> Result<Option<String>> {
        self.admin_repo().role_of(user_id).await
    }

    pub async fn any_admins(&self) -> Result<bool> {
        self.admin_repo().any_admins().await
    }

    pub async fn appoint_admin(&self, user_id: &str) -> Result<()> {
        self.admin_repo().appoint(user_id).await
    }

    pub async fn reset_admins(&self) -> Result<()> {
        self.admin_repo().reset().await
    }

    pub async fn set_role(&self, user_id: &str, role: &str) -> Result<()> {
        self.admin_repo().set_role(user_id, role).await
    }

    pub async fn admin_check(&self, user_id: &str) -> Result<Option<bool>> {
        self.admin_repo().admin_check(user_id).await
    }

    pub async fn counts_by_role(&self) -> Result<(u64, u64)> {
        self.admin_repo().counts_by_role().await
    }

    pub async fn list_users_with_roles(&self) -> Result<Vec<AdminUserRow>> {
        self.admin_repo().list_users().await
    }

    pub async fn registration_dates(&self) -> Result<Vec<String>> {
        self.admin_repo().registration_dates().await
    }

    // News & reviews

    pub async fn create_news(
        &self,
        title: &str,
        description: &str,
        author: Option<&str>,
    ) -> Result<()> {
        self.news_repo().create(title, description, author).await
    }

    pub async fn list_news(&self) -> Result<Vec<news::Model>> {
        self.news_repo().list().await
    }

    pub async fn latest_news(&self, limit: u64) -> Result<Vec<news::Model>> {
        self.news_repo().latest(limit).await
    }

    pub async fn delete_news(&self, news_id: i32) -> Result<()> {
        self.news_repo().delete(news_id).await
    }

    pub async fn add_review(&self, username: Option<&str>, text: &str) -> Result<()> {
        self.news_repo().add_review(username, text).await
    }

    pub async fn list_reviews(&self, limit: u64, offset: u64) -> Result<Vec<reviews::Model>> {
        self.news_repo().list_reviews(limit, offset).await
    }
}

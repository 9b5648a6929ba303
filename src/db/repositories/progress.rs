use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::constants::leveling::EXP_PER_WATCH_EVENT;
use crate::entities::{episode_progress, favorites, prelude::*, recent, watch_progress};
use crate::models::{ProgressUpdate, WatchStatus};
use crate::services::leveling;

use super::user::UserRepository;

pub struct ProgressRepository {
    conn: DatabaseConnection,
}

impl ProgressRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Applies a progress report. Title and image fall back to the stored
    /// values when the report omits them, a filled total can force the
    /// status to completed, and a completion or episode-count increase
    /// also refreshes the recent marker and awards experience, all inside
    /// one transaction.
    pub async fn apply_update(&self, update: &ProgressUpdate) -> Result<WatchStatus> {
        let txn = self.conn.begin().await?;

        let existing = WatchProgress::find()
            .filter(watch_progress::Column::UserId.eq(&update.user_id))
            .filter(watch_progress::Column::AnimeId.eq(&update.anime_id))
            .one(&txn)
            .await
            .context("Failed to query existing watch progress")?;

        let old_status = existing.as_ref().map(|row| row.status.clone());
        let old_episodes = existing.as_ref().map_or(0, |row| row.episodes_watched);

        let title = update
            .title
            .clone()
            .or_else(|| existing.as_ref().and_then(|row| row.title.clone()));
        let image_url = update
            .image_url
            .clone()
            .or_else(|| existing.as_ref().and_then(|row| row.image_url.clone()));

        let status = leveling::effective_status(
            update.status,
            update.episodes_watched,
            update.total_episodes,
        );
        let now = chrono::Utc::now().to_rfc3339();

        let row = watch_progress::ActiveModel {
            user_id: Set(update.user_id.clone()),
            anime_id: Set(update.anime_id.clone()),
            title: Set(title.clone()),
            image_url: Set(image_url.clone()),
            status: Set(status.as_str().to_string()),
            episodes_watched: Set(update.episodes_watched),
            total_episodes: Set(update.total_episodes),
            last_watch_date: Set(Some(now.clone())),
            ..Default::default()
        };

        WatchProgress::insert(row)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    watch_progress::Column::UserId,
                    watch_progress::Column::AnimeId,
                ])
                .update_columns([
                    watch_progress::Column::Title,
                    watch_progress::Column::ImageUrl,
                    watch_progress::Column::Status,
                    watch_progress::Column::EpisodesWatched,
                    watch_progress::Column::TotalEpisodes,
                    watch_progress::Column::LastWatchDate,
                ])
                .to_owned(),
            )
            .exec(&txn)
            .await?;

        if leveling::should_cascade(
            old_status.as_deref(),
            status,
            old_episodes,
            update.episodes_watched,
        ) {
            // Repeat sightings only refresh the timestamp; the marker keeps
            // whatever title and image the first sighting recorded.
            let marker = recent::ActiveModel {
                user_id: Set(update.user_id.clone()),
                anime_id: Set(update.anime_id.clone()),
                title: Set(title),
                image_url: Set(image_url),
                viewed_at: Set(now),
                ..Default::default()
            };
            Recent::insert(marker)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::columns([
                        recent::Column::UserId,
                        recent::Column::AnimeId,
                    ])
                    .update_column(recent::Column::ViewedAt)
                    .to_owned(),
                )
                .exec(&txn)
                .await?;

            UserRepository::award_exp(&txn, &update.user_id, EXP_PER_WATCH_EVENT).await?;
        }

        txn.commit().await?;

        info!(
            "Watch progress for user {} anime {}: {} ({} eps)",
            update.user_id,
            update.anime_id,
            status.as_str(),
            update.episodes_watched
        );
        Ok(status)
    }

    /// All progress rows for a user, most recently watched first.
    pub async fn rows_for_user(&self, user_id: &str) -> Result<Vec<watch_progress::Model>> {
        WatchProgress::find()
            .filter(watch_progress::Column::UserId.eq(user_id))
            .order_by_desc(watch_progress::Column::LastWatchDate)
            .all(&self.conn)
            .await
            .context("Failed to list watch progress")
    }

    pub async fn completed_rows(&self, user_id: &str) -> Result<Vec<watch_progress::Model>> {
        WatchProgress::find()
            .filter(watch_progress::Column::UserId.eq(user_id))
            .filter(watch_progress::Column::Status.eq(WatchStatus::Completed.as_str()))
            .order_by_desc(watch_progress::Column::LastWatchDate)
            .all(&self.conn)
            .await
            .context("Failed to list completed anime")
    }

    /// Direct status write for the lightweight watch-status endpoint. The
    /// total stays untouched on update and defaults to zero on insert.
    pub async fn set_status(
        &self,
        user_id: &str,
        anime_id: &str,
        status: WatchStatus,
        episodes_watched: i32,
        title: &str,
        image_url: &str,
    ) -> Result<()> {
        let row = watch_progress::ActiveModel {
            user_id: Set(user_id.to_string()),
            anime_id: Set(anime_id.to_string()),
            title: Set(Some(title.to_string())),
            image_url: Set(Some(image_url.to_string())),
            status: Set(status.as_str().to_string()),
            episodes_watched: Set(episodes_watched),
            total_episodes: Set(Some(0)),
            last_watch_date: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        };

        WatchProgress::insert(row)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    watch_progress::Column::UserId,
                    watch_progress::Column::AnimeId,
                ])
                .update_columns([
                    watch_progress::Column::Title,
                    watch_progress::Column::ImageUrl,
                    watch_progress::Column::Status,
                    watch_progress::Column::EpisodesWatched,
                    watch_progress::Column::LastWatchDate,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn delete_status(&self, user_id: &str, anime_id: &str) -> Result<()> {
        WatchProgress::delete_many()
            .filter(watch_progress::Column::UserId.eq(user_id))
            .filter(watch_progress::Column::AnimeId.eq(anime_id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn count_with_status(&self, user_id: &str, status: WatchStatus) -> Result<u64> {
        WatchProgress::find()
            .filter(watch_progress::Column::UserId.eq(user_id))
            .filter(watch_progress::Column::Status.eq(status.as_str()))
            .count(&self.conn)
            .await
            .context("Failed to count watch progress rows")
    }

    /// Per-status row counts plus the episode total across every status.
    pub async fn stats_for_user(&self, user_id: &str) -> Result<UserWatchStats> {
        let rows = WatchProgress::find()
            .select_only()
            .column(watch_progress::Column::Status)
            .column_as(watch_progress::Column::Id.count(), "count")
            .filter(watch_progress::Column::UserId.eq(user_id))
            .group_by(watch_progress::Column::Status)
            .into_model::<StatusCountRow>()
            .all(&self.conn)
            .await
            .context("Failed to count watch progress by status")?;

        let episodes: Option<Option<i64>> = WatchProgress::find()
            .select_only()
            .column_as(watch_progress::Column::EpisodesWatched.sum(), "total")
            .filter(watch_progress::Column::UserId.eq(user_id))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to sum watched episodes")?;

        let mut stats = UserWatchStats {
            total_episodes_watched: episodes.flatten().unwrap_or(0),
            ..Default::default()
        };
        for row in rows {
            match WatchStatus::parse(&row.status) {
                Some(WatchStatus::Completed) => stats.completed = row.count,
                Some(WatchStatus::Watching) => stats.watching = row.count,
                Some(WatchStatus::Planned) => stats.planned = row.count,
                Some(WatchStatus::Dropped) => stats.dropped = row.count,
                None => {}
            }
        }

        Ok(stats)
    }

    /// Completion counts across all users, grouped per anime.
    pub async fn global_watched(&self, limit: u64) -> Result<Vec<GlobalWatchedRow>> {
        WatchProgress::find()
            .select_only()
            .column(watch_progress::Column::AnimeId)
            .column(watch_progress::Column::Title)
            .column(watch_progress::Column::ImageUrl)
            .column_as(watch_progress::Column::Id.count(), "watch_count")
            .filter(watch_progress::Column::Status.eq(WatchStatus::Completed.as_str()))
            .group_by(watch_progress::Column::AnimeId)
            .group_by(watch_progress::Column::Title)
            .group_by(watch_progress::Column::ImageUrl)
            .order_by_desc(watch_progress::Column::Id.count())
            .limit(limit)
            .into_model::<GlobalWatchedRow>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate global watch counts")
    }

    /// Watch history joined against the user's favorites so each row can
    /// say whether it is also a favorite.
    pub async fn watched_detailed(&self, user_id: &str) -> Result<Vec<WatchedDetailedRow>> {
        WatchProgress::find()
            .select_only()
            .column(watch_progress::Column::AnimeId)
            .column(watch_progress::Column::Title)
            .column(watch_progress::Column::ImageUrl)
            .column(watch_progress::Column::EpisodesWatched)
            .column(watch_progress::Column::Status)
            .column(watch_progress::Column::LastWatchDate)
            .column_as(
                Expr::col((favorites::Entity, favorites::Column::AnimeId)).is_not_null(),
                "is_favorite",
            )
            .join(
                JoinType::LeftJoin,
                watch_progress::Entity::belongs_to(favorites::Entity)
                    .from(watch_progress::Column::AnimeId)
                    .to(favorites::Column::AnimeId)
                    .on_condition(|_left, _right| {
                        sea_orm::Condition::all().add(
                            sea_orm::sea_query::Expr::col((
                                watch_progress::Entity,
                                watch_progress::Column::UserId,
                            ))
                            .equals((favorites::Entity, favorites::Column::UserId)),
                        )
                    })
                    .into(),
            )
            .filter(watch_progress::Column::UserId.eq(user_id))
            .order_by_desc(watch_progress::Column::LastWatchDate)
            .into_model::<WatchedDetailedRow>()
            .all(&self.conn)
            .await
            .context("Failed to join watch history with favorites")
    }

    /// In-episode playback position, unique per user, anime and episode.
    pub async fn upsert_episode_progress(
        &self,
        user_id: &str,
        anime_id: &str,
        episode_number: i32,
        progress: f64,
    ) -> Result<()> {
        let row = episode_progress::ActiveModel {
            user_id: Set(user_id.to_string()),
            anime_id: Set(anime_id.to_string()),
            episode_number: Set(episode_number),
            progress: Set(progress),
            timestamp: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        EpisodeProgress::insert(row)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    episode_progress::Column::UserId,
                    episode_progress::Column::AnimeId,
                    episode_progress::Column::EpisodeNumber,
                ])
                .update_columns([
                    episode_progress::Column::Progress,
                    episode_progress::Column::Timestamp,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: String,
    count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UserWatchStats {
    pub completed: i64,
    pub watching: i64,
    pub planned: i64,
    pub dropped: i64,
    pub total_episodes_watched: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct GlobalWatchedRow {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub watch_count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct WatchedDetailedRow {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub episodes_watched: i32,
    pub status: String,
    pub last_watch_date: Option<String>,
    pub is_favorite: bool,
}

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::{MessageResponse, or_placeholder};
use super::validation::{require_non_empty, validate_watch_status};
use super::{ApiError, AppState};
use crate::constants::limits::DEFAULT_GLOBAL_WATCHED_LIMIT;
use crate::models::ProgressUpdate;

#[derive(Deserialize)]
pub struct WatchProgressRequest {
    pub user_id: String,
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    #[serde(default)]
    pub episodes_watched: i32,
    pub total_episodes: Option<i32>,
}

#[derive(Serialize)]
pub struct ProgressUpdatedResponse {
    pub message: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct EpisodeProgressRequest {
    pub user_id: String,
    pub anime_id: String,
    pub episode_number: i32,
    pub progress: f64,
}

#[derive(Deserialize)]
pub struct WatchStatusRequest {
    #[serde(rename = "animeId")]
    pub anime_id: String,
    pub status: String,
    #[serde(default)]
    pub episodes: Option<i32>,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct WatchStatusResponse {
    pub status: String,
    pub watched_count: u64,
    pub in_progress_count: u64,
}

#[derive(Serialize)]
pub struct CompletedItem {
    #[serde(rename = "animeId")]
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: String,
    pub episodes: i32,
    pub rating: i32,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<String>,
}

#[derive(Serialize)]
pub struct InProgressItem {
    #[serde(rename = "animeId")]
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: String,
    pub status: String,
    #[serde(rename = "currentEpisode")]
    pub current_episode: i32,
    pub episodes: Option<i32>,
    #[serde(rename = "lastWatched")]
    pub last_watched: Option<String>,
}

#[derive(Serialize)]
pub struct WatchSummaryStats {
    #[serde(rename = "totalEpisodesWatched")]
    pub total_episodes_watched: i64,
    #[serde(rename = "totalTimeSpent")]
    pub total_time_spent: i64,
    #[serde(rename = "averageRating")]
    pub average_rating: i32,
    pub completed_count: i64,
    pub watching_count: i64,
}

#[derive(Serialize)]
pub struct WatchSummaryResponse {
    pub completed: Vec<CompletedItem>,
    #[serde(rename = "inProgress")]
    pub in_progress: Vec<InProgressItem>,
    pub stats: WatchSummaryStats,
}

impl WatchSummaryResponse {
    /// Unknown users get the empty structure rather than a 404, so the
    /// profile page renders before first login.
    fn empty() -> Self {
        Self {
            completed: Vec::new(),
            in_progress: Vec::new(),
            stats: WatchSummaryStats {
                total_episodes_watched: 0,
                total_time_spent: 0,
                average_rating: 0,
                completed_count: 0,
                watching_count: 0,
            },
        }
    }
}

#[derive(Serialize)]
pub struct WatchedListItem {
    #[serde(rename = "animeId")]
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: String,
    pub episodes: i32,
    pub total_episodes: Option<i32>,
    pub completed_at: Option<String>,
}

#[derive(Serialize)]
pub struct WatchedMinimalItem {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct QuickStatsResponse {
    pub favorites_count: u64,
    pub watched_count: u64,
    pub in_progress_count: u64,
}

#[derive(Serialize)]
pub struct UserStatsResponse {
    pub completed_anime: i64,
    pub watching_anime: i64,
    pub planned_anime: i64,
    pub dropped_anime: i64,
    pub total_episodes_watched: i64,
}

#[derive(Deserialize)]
pub struct GlobalWatchedQuery {
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct GlobalWatchedItem {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub watch_count: i64,
}

#[derive(Serialize)]
pub struct WatchedDetailedItem {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub episodes_watched: i32,
    pub status: String,
    pub last_watch_date: Option<String>,
    pub is_favorite: bool,
}

pub async fn update_watch_progress(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WatchProgressRequest>,
) -> Result<Json<ProgressUpdatedResponse>, ApiError> {
    let status = validate_watch_status(&payload.status)?;

    if !state.store().user_exists(&payload.user_id).await? {
        return Err(ApiError::user_not_found(&payload.user_id));
    }

    let update = ProgressUpdate {
        user_id: payload.user_id,
        anime_id: payload.anime_id,
        title: payload.title,
        image_url: payload.image_url,
        status,
        episodes_watched: payload.episodes_watched,
        total_episodes: payload.total_episodes,
    };
    let stored = state.store().apply_watch_progress(&update).await?;

    Ok(Json(ProgressUpdatedResponse {
        message: "Progress updated successfully".to_string(),
        status: stored.as_str().to_string(),
    }))
}

pub async fn get_watch_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<WatchSummaryResponse>, ApiError> {
    if !state.store().user_exists(&user_id).await? {
        return Ok(Json(WatchSummaryResponse::empty()));
    }

    let rows = state.store().watch_progress_for(&user_id).await?;

    let mut completed = Vec::new();
    let mut in_progress = Vec::new();
    let mut total_episodes: i64 = 0;
    let mut completed_count: i64 = 0;
    let mut watching_count: i64 = 0;

    for row in rows {
        total_episodes += i64::from(row.episodes_watched);
        match row.status.as_str() {
            "completed" => {
                completed_count += 1;
                completed.push(CompletedItem {
                    anime_id: row.anime_id,
                    title: row.title,
                    image_url: or_placeholder(row.image_url),
                    episodes: row.episodes_watched,
                    rating: 0,
                    completed_at: row.last_watch_date,
                });
            }
            "watching" => {
                watching_count += 1;
                in_progress.push(InProgressItem {
                    anime_id: row.anime_id,
                    title: row.title,
                    image_url: or_placeholder(row.image_url),
                    status: row.status,
                    current_episode: row.episodes_watched,
                    episodes: row.total_episodes,
                    last_watched: row.last_watch_date,
                });
            }
            _ => {}
        }
    }

    let stats = WatchSummaryStats {
        total_episodes_watched: total_episodes,
        // Roughly 24 minutes per episode
        total_time_spent: total_episodes * 24 * 60,
        average_rating: 0,
        completed_count,
        watching_count,
    };

    Ok(Json(WatchSummaryResponse {
        completed,
        in_progress,
        stats,
    }))
}

pub async fn update_episode_progress(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EpisodeProgressRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .store()
        .upsert_episode_progress(
            &payload.user_id,
            &payload.anime_id,
            payload.episode_number,
            payload.progress,
        )
        .await?;

    Ok(Json(MessageResponse::new("Episode progress updated")))
}

pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStatsResponse>, ApiError> {
    let stats = state.store().user_watch_stats(&user_id).await?;

    Ok(Json(UserStatsResponse {
        completed_anime: stats.completed,
        watching_anime: stats.watching,
        planned_anime: stats.planned,
        dropped_anime: stats.dropped,
        total_episodes_watched: stats.total_episodes_watched,
    }))
}

pub async fn update_watch_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<WatchStatusRequest>,
) -> Result<Json<WatchStatusResponse>, ApiError> {
    let status = validate_watch_status(&payload.status)?;

    let title = payload.title.as_deref().unwrap_or_default();
    let image_url = payload.image_url.as_deref().unwrap_or_default();
    require_non_empty(title, "Title and image_url are required")?;
    require_non_empty(image_url, "Title and image_url are required")?;

    state
        .store()
        .set_watch_status(
            &user_id,
            &payload.anime_id,
            status,
            payload.episodes.unwrap_or(0),
            title,
            image_url,
        )
        .await?;

    let watched_count = state
        .store()
        .count_with_status(&user_id, crate::models::WatchStatus::Completed)
        .await?;
    let in_progress_count = state
        .store()
        .count_with_status(&user_id, crate::models::WatchStatus::Watching)
        .await?;

    Ok(Json(WatchStatusResponse {
        status: "success".to_string(),
        watched_count,
        in_progress_count,
    }))
}

pub async fn delete_watch_status(
    State(state): State<Arc<AppState>>,
    Path((user_id, anime_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store()
        .delete_watch_status(&user_id, &anime_id)
        .await?;

    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

pub async fn get_watched_list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<WatchedListItem>>, ApiError> {
    let rows = state.store().completed_for(&user_id).await?;

    let items = rows
        .into_iter()
        .map(|row| WatchedListItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: or_placeholder(row.image_url),
            episodes: row.episodes_watched,
            total_episodes: row.total_episodes,
            completed_at: row.last_watch_date,
        })
        .collect();

    Ok(Json(items))
}

pub async fn get_watched_minimal(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<WatchedMinimalItem>>, ApiError> {
    let rows = state.store().completed_for(&user_id).await?;

    let items = rows
        .into_iter()
        .map(|row| WatchedMinimalItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: row.image_url,
        })
        .collect();

    Ok(Json(items))
}

pub async fn get_quick_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<QuickStatsResponse>, ApiError> {
    let favorites_count = state.store().favorites_count(&user_id).await?;
    let watched_count = state
        .store()
        .count_with_status(&user_id, crate::models::WatchStatus::Completed)
        .await?;
    let in_progress_count = state
        .store()
        .count_with_status(&user_id, crate::models::WatchStatus::Watching)
        .await?;

    Ok(Json(QuickStatsResponse {
        favorites_count,
        watched_count,
        in_progress_count,
    }))
}

pub async fn get_global_watched(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GlobalWatchedQuery>,
) -> Result<Json<Vec<GlobalWatchedItem>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_GLOBAL_WATCHED_LIMIT);
    let rows = state.store().global_watched(limit).await?;

    let items = rows
        .into_iter()
        .map(|row| GlobalWatchedItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: row.image_url,
            watch_count: row.watch_count,
        })
        .collect();

    Ok(Json(items))
}

pub async fn get_watched_detailed(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<WatchedDetailedItem>>, ApiError> {
    let rows = state.store().watched_detailed(&user_id).await?;

    let items = rows
        .into_iter()
        .map(|row| WatchedDetailedItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: row.image_url,
            episodes_watched: row.episodes_watched,
            status: row.status,
            last_watch_date: row.last_watch_date,
            is_favorite: row.is_favorite,
        })
        .collect();

    Ok(Json(items))
}

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::MessageResponse;
use super::{ApiError, AppState};
use crate::constants::limits::{DEFAULT_NOW_WATCHING_LIMIT, RECENT_HISTORY_LIMIT};

#[derive(Deserialize)]
pub struct RecentAnimeRequest {
    pub user_id: String,
    pub anime_id: String,
    pub title: String,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct RecentItem {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub viewed_at: String,
}

#[derive(Deserialize)]
pub struct NowWatchingRequest {
    pub anime_id: String,
    pub title: String,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct NowWatchingQuery {
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct NowWatchingItem {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

pub async fn get_recent(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<RecentItem>>, ApiError> {
    let rows = state
        .store()
        .recent_for(&user_id, RECENT_HISTORY_LIMIT)
        .await?;

    let items = rows
        .into_iter()
        .map(|row| RecentItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: row.image_url,
            viewed_at: row.viewed_at,
        })
        .collect();

    Ok(Json(items))
}

pub async fn add_recent(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecentAnimeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store().user_exists(&payload.user_id).await? {
        return Err(ApiError::user_not_found(&payload.user_id));
    }

    state
        .store()
        .push_recent(
            &payload.user_id,
            &payload.anime_id,
            Some(&payload.title),
            payload.image_url.as_deref(),
        )
        .await?;

    Ok(Json(MessageResponse::new("Recent anime added successfully")))
}

pub async fn set_now_watching(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NowWatchingRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store()
        .set_now_watching(
            &payload.anime_id,
            Some(&payload.title),
            payload.image_url.as_deref(),
        )
        .await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

pub async fn get_now_watching(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NowWatchingQuery>,
) -> Result<Json<Vec<NowWatchingItem>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_NOW_WATCHING_LIMIT);
    let rows = state.store().now_watching(limit).await?;

    let items = rows
        .into_iter()
        .map(|row| NowWatchingItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: row.image_url,
        })
        .collect();

    Ok(Json(items))
}

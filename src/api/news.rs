use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::constants::limits::{DEFAULT_REVIEWS_LIMIT, PUBLIC_NEWS_LIMIT};

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub username: Option<String>,
    pub text: String,
}

#[derive(Deserialize)]
pub struct ReviewsQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Serialize)]
pub struct ReviewItem {
    pub username: Option<String>,
    pub text: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct PublicNewsItem {
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    pub created_at: String,
}

pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store()
        .add_review(payload.username.as_deref(), &payload.text)
        .await?;

    Ok(Json(serde_json::json!({ "status": "success" })))
}

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<Vec<ReviewItem>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_REVIEWS_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let rows = state.store().list_reviews(limit, offset).await?;

    let items = rows
        .into_iter()
        .map(|row| ReviewItem {
            username: row.username,
            text: row.text,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(items))
}

pub async fn get_public_news(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicNewsItem>>, ApiError> {
    let rows = state.store().latest_news(PUBLIC_NEWS_LIMIT).await?;

    let items = rows
        .into_iter()
        .map(|row| PublicNewsItem {
            title: row.title,
            description: row.description,
            author: row.author,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(items))
}

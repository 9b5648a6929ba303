use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::or_placeholder;
use super::validation::{require_non_empty, validate_favorite_action};
use super::{ApiError, AppState};
use crate::models::{FavoriteAction, FavoriteOutcome};

#[derive(Deserialize)]
pub struct FavoriteActionRequest {
    #[serde(rename = "animeId")]
    pub anime_id: String,
    pub action: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct FavoriteCard {
    pub id: String,
    pub title: Option<String>,
    pub image: String,
    #[serde(rename = "addedAt")]
    pub added_at: String,
}

#[derive(Serialize)]
pub struct ManageFavoritesResponse {
    pub status: String,
    pub action: String,
    pub count: usize,
    pub favorites: Vec<FavoriteCard>,
}

#[derive(Serialize)]
pub struct FavoriteItem {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct FavoriteDetailedItem {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub episodes_watched: i64,
    pub last_watch_date: Option<String>,
}

pub async fn manage_favorites(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<FavoriteActionRequest>,
) -> Result<Json<ManageFavoritesResponse>, ApiError> {
    let action = validate_favorite_action(&payload.action)?;

    if !state.store().user_exists(&user_id).await? {
        return Err(ApiError::user_not_found(&user_id));
    }

    if action == FavoriteAction::Add {
        require_non_empty(
            payload.title.as_deref().unwrap_or_default(),
            "Title and anime ID are required",
        )?;
        require_non_empty(&payload.anime_id, "Title and anime ID are required")?;
    }

    let outcome = state
        .store()
        .toggle_favorite(
            &user_id,
            action,
            &payload.anime_id,
            payload.title.as_deref(),
            payload.image_url.as_deref(),
        )
        .await?;

    if outcome == FavoriteOutcome::Missing {
        return Err(ApiError::NotFound("Anime not found in favorites".to_string()));
    }

    let favorites: Vec<FavoriteCard> = state
        .store()
        .list_favorites(&user_id)
        .await?
        .into_iter()
        .map(|row| FavoriteCard {
            id: row.anime_id,
            title: row.title,
            image: or_placeholder(row.image_url),
            added_at: row.created_at,
        })
        .collect();

    Ok(Json(ManageFavoritesResponse {
        status: "success".to_string(),
        action: action.as_str().to_string(),
        count: favorites.len(),
        favorites,
    }))
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FavoriteItem>>, ApiError> {
    let rows = state.store().list_favorites(&user_id).await?;

    let items = rows
        .into_iter()
        .map(|row| FavoriteItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: row.image_url,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(items))
}

pub async fn get_favorites_detailed(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FavoriteDetailedItem>>, ApiError> {
    let rows = state.store().favorites_detailed(&user_id).await?;

    let items = rows
        .into_iter()
        .map(|row| FavoriteDetailedItem {
            anime_id: row.anime_id,
            title: row.title,
            image_url: row.image_url,
            episodes_watched: row.episodes_watched,
            last_watch_date: row.last_watch_date,
        })
        .collect();

    Ok(Json(items))
}

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::constants::leveling::EXP_PER_WATCH_EVENT;
use crate::db::UnlockOutcome;
use crate::services::leveling;

#[derive(Deserialize)]
pub struct AchievementRequest {
    pub name: String,
    pub description: String,
    pub icon_path: Option<String>,
    #[serde(default)]
    pub exp_reward: i32,
}

#[derive(Serialize)]
pub struct AchievementCreatedResponse {
    pub status: String,
    pub id: i32,
}

#[derive(Serialize)]
pub struct AchievementItem {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub icon_path: Option<String>,
    pub exp_reward: i32,
}

#[derive(Serialize)]
pub struct UnlockedAchievementItem {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub icon_path: Option<String>,
    pub exp_reward: i32,
    pub unlocked_at: String,
}

#[derive(Serialize)]
pub struct UnlockResponse {
    pub status: String,
    pub exp_gained: i32,
}

#[derive(Serialize)]
pub struct LevelProgressResponse {
    pub level: i32,
    pub exp: i32,
    pub next_level_exp: i32,
}

pub async fn create_achievement(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AchievementRequest>,
) -> Result<Json<AchievementCreatedResponse>, ApiError> {
    let id = state
        .store()
        .create_achievement(
            &payload.name,
            &payload.description,
            payload.icon_path.as_deref(),
            payload.exp_reward,
        )
        .await?;

    Ok(Json(AchievementCreatedResponse {
        status: "success".to_string(),
        id,
    }))
}

pub async fn list_achievements(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AchievementItem>>, ApiError> {
    let rows = state.store().list_achievements().await?;

    let items = rows
        .into_iter()
        .map(|row| AchievementItem {
            id: row.id,
            name: row.name,
            description: row.description,
            icon_path: row.icon_path,
            exp_reward: row.exp_reward,
        })
        .collect();

    Ok(Json(items))
}

pub async fn get_user_achievements(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UnlockedAchievementItem>>, ApiError> {
    let rows = state.store().achievements_for_user(&user_id).await?;

    let items = rows
        .into_iter()
        .map(|row| UnlockedAchievementItem {
            id: row.id,
            name: row.name,
            description: row.description,
            icon_path: row.icon_path,
            exp_reward: row.exp_reward,
            unlocked_at: row.unlocked_at,
        })
        .collect();

    Ok(Json(items))
}

pub async fn unlock_achievement(
    State(state): State<Arc<AppState>>,
    Path((user_id, achievement_id)): Path<(String, i32)>,
) -> Result<Json<UnlockResponse>, ApiError> {
    if !state.store().user_exists(&user_id).await? {
        return Err(ApiError::user_not_found(&user_id));
    }
    if state.store().get_achievement(achievement_id).await?.is_none() {
        return Err(ApiError::not_found("Achievement", achievement_id));
    }

    match state
        .store()
        .unlock_achievement(&user_id, achievement_id)
        .await?
    {
        UnlockOutcome::Unlocked { exp_gained, .. } => Ok(Json(UnlockResponse {
            status: "success".to_string(),
            exp_gained,
        })),
        UnlockOutcome::AlreadyUnlocked => Err(ApiError::Conflict(
            "Achievement already unlocked".to_string(),
        )),
        UnlockOutcome::UnknownAchievement => {
            Err(ApiError::not_found("Achievement", achievement_id))
        }
        UnlockOutcome::UnknownUser => Err(ApiError::user_not_found(&user_id)),
    }
}

pub async fn get_level_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<LevelProgressResponse>, ApiError> {
    let snapshot = state
        .store()
        .user_level_progress(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(LevelProgressResponse {
        level: snapshot.level,
        exp: snapshot.exp,
        next_level_exp: leveling::next_level_threshold(snapshot.level),
    }))
}

pub async fn watch_episode(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<LevelProgressResponse>, ApiError> {
    let snapshot = state
        .store()
        .award_episode_exp(&user_id, EXP_PER_WATCH_EVENT)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(LevelProgressResponse {
        level: snapshot.level,
        exp: snapshot.exp,
        next_level_exp: leveling::next_level_threshold(snapshot.level),
    }))
}

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::types::MessageResponse;
use super::{ApiError, AppState};

#[derive(Serialize)]
pub struct DebugUserItem {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct DebugUsersResponse {
    pub users: Vec<DebugUserItem>,
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("AnimeWatch API"))
}

pub async fn debug_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DebugUsersResponse>, ApiError> {
    let users = state
        .store()
        .list_users()
        .await?
        .into_iter()
        .map(|user| DebugUserItem {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
        })
        .collect();

    Ok(Json(DebugUsersResponse { users }))
}

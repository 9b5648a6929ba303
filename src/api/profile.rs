use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::StatusMessage;
use super::{ApiError, AppState};

#[derive(Deserialize)]
pub struct UserUpdateRequest {
    pub username: String,
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct UserProfileResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct AvatarUploadResponse {
    pub status: String,
    pub avatar_path: String,
}

#[derive(Serialize)]
pub struct AvatarPathResponse {
    pub avatar_path: Option<String>,
}

pub async fn upsert_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store()
        .upsert_user_profile(&user_id, &payload.username, payload.email.as_deref())
        .await?;

    Ok(Json(serde_json::json!({ "status": "success" })))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let user = state
        .store()
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfileResponse {
        user_id: user.user_id,
        username: user.username,
        email: user.email,
        avatar_url: user.avatar_path,
        created_at: user.created_at,
    }))
}

pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<AvatarUploadResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(e.to_string()))?;
            upload = Some((file_name.unwrap_or_default(), bytes.to_vec()));
        }
    }

    let Some((file_name, bytes)) = upload else {
        return Err(ApiError::unprocessable("Field 'file' is required"));
    };
    if file_name.is_empty() {
        return Err(ApiError::validation("Filename is required"));
    }

    let avatar_url = state.avatars().save(&user_id, &file_name, &bytes).await?;

    let updated = state.store().set_avatar_path(&user_id, &avatar_url).await?;
    if updated == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(AvatarUploadResponse {
        status: "success".to_string(),
        avatar_path: avatar_url,
    }))
}

pub async fn get_avatar(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AvatarPathResponse>, ApiError> {
    let avatar_path = state.store().avatar_path(&user_id).await?;

    Ok(Json(AvatarPathResponse { avatar_path }))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<StatusMessage>, ApiError> {
    let mut username: Option<String> = None;
    let mut email: Option<String> = None;
    let mut avatar: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.to_string()))?
    {
        match field.name() {
            Some("username") => {
                username = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::validation(e.to_string()))?,
                );
            }
            Some("email") => {
                email = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::validation(e.to_string()))?,
                );
            }
            Some("avatar") => {
                let file_name = field.file_name().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(e.to_string()))?;
                if let Some(name) = file_name
                    && !name.is_empty()
                {
                    avatar = Some((name, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    let Some(username) = username else {
        return Err(ApiError::unprocessable("Field 'username' is required"));
    };
    let Some(email) = email else {
        return Err(ApiError::unprocessable("Field 'email' is required"));
    };

    let avatar_url = match avatar {
        Some((file_name, bytes)) => {
            Some(state.avatars().save(&user_id, &file_name, &bytes).await?)
        }
        None => None,
    };

    state
        .store()
        .update_user_profile(
            &user_id,
            &username,
            &email.to_lowercase(),
            avatar_url.as_deref(),
        )
        .await?;

    Ok(Json(StatusMessage::success("Profile updated successfully")))
}

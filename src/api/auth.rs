use axum::{Form, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::accounts::{AuthenticatedAccount, RegisteredAccount};

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Json<RegisteredAccount>, ApiError> {
    let account = state
        .accounts()
        .register(&form.username, &form.email, &form.password)
        .await?;

    Ok(Json(account))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AuthenticatedAccount>, ApiError> {
    let account = state.accounts().login(&form.email, &form.password).await?;

    Ok(Json(account))
}

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::types::StatusMessage;
use super::validation::validate_role;
use super::{ApiError, AppState};
use crate::constants::analytics::{CUMULATIVE_WINDOW_DAYS, NEW_USERS_WINDOW_DAYS};

#[derive(Deserialize)]
pub struct AdminSetupRequest {
    #[serde(rename = "setupKey")]
    pub setup_key: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct RoleUpdateRequest {
    pub role: String,
}

#[derive(Serialize)]
pub struct AdminCheckResponse {
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

#[derive(Serialize)]
pub struct AdminStatsResponse {
    pub users: u64,
    pub admins: u64,
}

#[derive(Serialize)]
pub struct AdminUserItem {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DailySignupPoint {
    pub date: String,
    pub count: i64,
}

#[derive(Serialize)]
pub struct CumulativeSignupsResponse {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

#[derive(Deserialize)]
pub struct NewsRequest {
    pub title: String,
    pub description: String,
    pub author: Option<String>,
}

#[derive(Serialize)]
pub struct NewsItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    pub created_at: String,
}

pub async fn setup_admin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdminSetupRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let setup_key = state.config().read().await.admin.setup_key.clone();
    if !state.verifier().verify(&setup_key, &payload.setup_key).await {
        return Err(ApiError::Unauthorized("Invalid setup key".to_string()));
    }

    let user = state
        .store()
        .get_user_by_email(&payload.email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if state.store().any_admins().await? {
        return Err(ApiError::validation("Administrator already exists"));
    }

    state.store().appoint_admin(&user.user_id).await?;

    Ok(Json(StatusMessage::success("Administrator setup completed")))
}

pub async fn reset_admin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdminSetupRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let setup_key = state.config().read().await.admin.setup_key.clone();
    if !state.verifier().verify(&setup_key, &payload.setup_key).await {
        return Err(ApiError::Unauthorized("Invalid setup key".to_string()));
    }

    state.store().reset_admins().await?;

    Ok(Json(StatusMessage::success("Administrator reset completed")))
}

pub async fn check_admin(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AdminCheckResponse>, ApiError> {
    let is_admin = state
        .store()
        .admin_check(&user_id)
        .await?
        .unwrap_or(false);

    Ok(Json(AdminCheckResponse { is_admin }))
}

pub async fn get_admin_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminStatsResponse>, ApiError> {
    let (users, admins) = state.store().counts_by_role().await?;

    Ok(Json(AdminStatsResponse { users, admins }))
}

pub async fn list_admin_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AdminUserItem>>, ApiError> {
    let rows = state.store().list_users_with_roles().await?;

    let items = rows
        .into_iter()
        .map(|row| AdminUserItem {
            id: row.user_id,
            username: row.username,
            email: row.email,
            avatar_url: row.avatar_path,
            role: row.role.unwrap_or_else(|| "user".to_string()),
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(items))
}

pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<RoleUpdateRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let role = validate_role(&payload.role)?;

    if !state.store().user_exists(&user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state.store().set_role(&user_id, role).await?;

    Ok(Json(StatusMessage::success("Role updated successfully")))
}

pub async fn get_new_users_week(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DailySignupPoint>>, ApiError> {
    let dates = state.store().registration_dates().await?;
    let today = chrono::Utc::now().date_naive();

    Ok(Json(daily_signup_series(
        &dates,
        today,
        NEW_USERS_WINDOW_DAYS,
    )))
}

pub async fn get_users_cumulative(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CumulativeSignupsResponse>, ApiError> {
    let dates = state.store().registration_dates().await?;
    let today = chrono::Utc::now().date_naive();

    let (labels, data) = cumulative_signup_series(&dates, today, CUMULATIVE_WINDOW_DAYS);

    Ok(Json(CumulativeSignupsResponse { labels, data }))
}

pub async fn create_news(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store()
        .create_news(
            &payload.title,
            &payload.description,
            payload.author.as_deref(),
        )
        .await?;

    Ok(Json(serde_json::json!({ "status": "success" })))
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let rows = state.store().list_news().await?;

    let items = rows
        .into_iter()
        .map(|row| NewsItem {
            id: row.id,
            title: row.title,
            description: row.description,
            author: row.author,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(items))
}

pub async fn delete_news(
    State(state): State<Arc<AppState>>,
    Path(news_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store().delete_news(news_id).await?;

    Ok(Json(serde_json::json!({ "status": "success" })))
}

fn parse_registration_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Signups per day over the trailing window ending today, zero-filled so
/// the chart always has one point per day.
fn daily_signup_series(dates: &[String], today: NaiveDate, window_days: i64) -> Vec<DailySignupPoint> {
    let start = today - Duration::days(window_days - 1);

    let mut counts: HashMap<NaiveDate, i64> = HashMap::new();
    for raw in dates {
        if let Some(day) = parse_registration_date(raw) {
            *counts.entry(day).or_insert(0) += 1;
        }
    }

    (0..window_days)
        .map(|offset| {
            let day = start + Duration::days(offset);
            DailySignupPoint {
                date: day.format("%Y-%m-%d").to_string(),
                count: counts.get(&day).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Total accounts registered up to each day of the trailing window, with
/// `DD.MM` labels for the chart axis.
fn cumulative_signup_series(
    dates: &[String],
    today: NaiveDate,
    window_days: i64,
) -> (Vec<String>, Vec<i64>) {
    let start = today - Duration::days(window_days - 1);

    let mut parsed: Vec<NaiveDate> = dates.iter().filter_map(|d| parse_registration_date(d)).collect();
    parsed.sort_unstable();

    let capacity = usize::try_from(window_days).unwrap_or_default();
    let mut labels = Vec::with_capacity(capacity);
    let mut data = Vec::with_capacity(capacity);
    for offset in 0..window_days {
        let day = start + Duration::days(offset);
        labels.push(day.format("%d.%m").to_string());
        let up_to = parsed.partition_point(|d| *d <= day);
        data.push(up_to as i64);
    }

    (labels, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_series_zero_fills_the_window() {
        let today = date(2024, 5, 10);
        let dates = vec![
            "2024-05-10T08:00:00+00:00".to_string(),
            "2024-05-10T09:30:00+00:00".to_string(),
            "2024-05-06T12:00:00+00:00".to_string(),
            // Outside the window, must not appear
            "2024-04-01T00:00:00+00:00".to_string(),
        ];

        let series = daily_signup_series(&dates, today, 7);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, "2024-05-04");
        assert_eq!(series[0].count, 0);
        assert_eq!(series[2].date, "2024-05-06");
        assert_eq!(series[2].count, 1);
        assert_eq!(series[6].date, "2024-05-10");
        assert_eq!(series[6].count, 2);
    }

    #[test]
    fn daily_series_ignores_unparseable_dates() {
        let today = date(2024, 5, 10);
        let dates = vec!["not-a-date".to_string(), "2024-05-10".to_string()];

        let series = daily_signup_series(&dates, today, 7);

        assert_eq!(series[6].count, 1);
    }

    #[test]
    fn cumulative_series_counts_everything_up_to_each_day() {
        let today = date(2024, 5, 30);
        let dates = vec![
            // Registered long before the window; still counted in totals
            "2024-01-15T00:00:00+00:00".to_string(),
            "2024-05-02T10:00:00+00:00".to_string(),
            "2024-05-30T10:00:00+00:00".to_string(),
        ];

        let (labels, data) = cumulative_signup_series(&dates, today, 30);

        assert_eq!(labels.len(), 30);
        assert_eq!(data.len(), 30);
        assert_eq!(labels[0], "01.05");
        assert_eq!(labels[29], "30.05");
        assert_eq!(data[0], 1);
        assert_eq!(data[1], 2);
        assert_eq!(data[28], 2);
        assert_eq!(data[29], 3);
        assert!(data.windows(2).all(|w| w[0] <= w[1]));
    }
}

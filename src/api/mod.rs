//! HTTP surface: route table, shared application state and the JSON
//! error/response conventions used by every handler.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{AccountService, AvatarStore, CredentialVerifier};
use crate::state::SharedState;

pub mod achievements;
pub mod activity;
pub mod admin;
pub mod auth;
mod error;
pub mod favorites;
pub mod news;
pub mod profile;
pub mod progress;
pub mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.shared.accounts
    }

    #[must_use]
    pub fn verifier(&self) -> &Arc<dyn CredentialVerifier> {
        &self.shared.verifier
    }

    #[must_use]
    pub fn avatars(&self) -> &Arc<AvatarStore> {
        &self.shared.avatars
    }
}

/// Wraps an already-built [`SharedState`] for the router.
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState { shared })
}

/// Convenience constructor used by the binary and the integration tests:
/// builds the full service stack from a [`Config`].
pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = SharedState::new(config).await?;
    Ok(create_app_state(Arc::new(shared)))
}

/// Builds the application router with CORS, tracing and static avatar
/// serving wired in.
pub async fn router(state: Arc<AppState>) -> Router {
    let (avatars_path, cors_origins) = {
        let config = state.config().read().await;
        (
            config.media.avatars_path.clone(),
            config.server.cors_allowed_origins.clone(),
        )
    };

    let api_router = create_api_router().with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(api_router)
        .nest_service("/avatars", ServeDir::new(avatars_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(system::root))
        .route("/debug/users", get(system::debug_users))
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/user/{user_id}", post(profile::upsert_user))
        .route("/user/{user_id}", get(profile::get_user))
        .route("/avatar/{user_id}", post(profile::upload_avatar))
        .route("/avatar/{user_id}", get(profile::get_avatar))
        .route("/update-profile/{user_id}", post(profile::update_profile))
        // Watch progress
        .route("/watch-progress", post(progress::update_watch_progress))
        .route("/watch-progress/{user_id}", get(progress::get_watch_progress))
        .route("/episode-progress", post(progress::update_episode_progress))
        .route("/user-stats/{user_id}", get(progress::get_user_stats))
        .route("/watch-status/{user_id}", post(progress::update_watch_status))
        .route(
            "/watch-status/{user_id}/{anime_id}",
            delete(progress::delete_watch_status),
        )
        .route("/watched-list/{user_id}", get(progress::get_watched_list))
        .route("/watched/{user_id}", get(progress::get_watched_minimal))
        .route("/stats/{user_id}", get(progress::get_quick_stats))
        .route("/watched-anime/global", get(progress::get_global_watched))
        .route(
            "/user/{user_id}/watched-detailed",
            get(progress::get_watched_detailed),
        )
        // Favorites
        .route("/favorites/{user_id}", post(favorites::manage_favorites))
        .route(
            "/favorites/{user_id}/manage",
            post(favorites::manage_favorites),
        )
        .route("/favorites/{user_id}", get(favorites::list_favorites))
        .route(
            "/user/{user_id}/favorites-detailed",
            get(favorites::get_favorites_detailed),
        )
        // Activity feeds
        .route("/recent/{user_id}", get(activity::get_recent))
        .route("/recent", post(activity::add_recent))
        .route("/now-watching", post(activity::set_now_watching))
        .route("/now-watching", get(activity::get_now_watching))
        // Achievements & leveling
        .route("/achievements", post(achievements::create_achievement))
        .route("/achievements", get(achievements::list_achievements))
        .route(
            "/user/{user_id}/achievements",
            get(achievements::get_user_achievements),
        )
        .route(
            "/user/{user_id}/achievements/{achievement_id}",
            post(achievements::unlock_achievement),
        )
        .route("/user/{user_id}/progress", get(achievements::get_level_progress))
        .route("/user/{user_id}/watch-episode", post(achievements::watch_episode))
        // Administration
        .route("/admin/setup", post(admin::setup_admin))
        .route("/admin/reset", post(admin::reset_admin))
        .route("/admin/check/{user_id}", get(admin::check_admin))
        .route("/admin/stats", get(admin::get_admin_stats))
        .route("/admin/users", get(admin::list_admin_users))
        .route("/admin/users/{user_id}/role", put(admin::update_user_role))
        .route("/admin/new-users-week", get(admin::get_new_users_week))
        .route("/admin/users-cumulative", get(admin::get_users_cumulative))
        // News & reviews
        .route("/admin/news", post(admin::create_news))
        .route("/admin/news", get(admin::list_news))
        .route("/admin/news/{news_id}", delete(admin::delete_news))
        .route("/news", get(news::get_public_news))
        .route("/reviews", post(news::add_review))
        .route("/reviews", get(news::list_reviews))
}

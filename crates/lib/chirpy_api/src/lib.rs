//! # chirpy_api
//!
//! HTTP API library for Chirpy.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use chirpy_core::auth::AuthError;
use chirpy_core::auth::session::SessionAuthority;
use chirpy_core::store::{RefreshTokenStore, UserStore};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, users, webhooks};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Login, refresh, revoke and bearer authentication.
    pub sessions: Arc<SessionAuthority>,
    /// User records.
    pub users: Arc<dyn UserStore>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Build the state over the given storage backends.
    pub fn new(
        config: ApiConfig,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Result<Self, AuthError> {
        let sessions = SessionAuthority::new(&config.auth, users.clone(), refresh_tokens)?;
        Ok(Self {
            sessions: Arc::new(sessions),
            users,
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/healthz", get(health::healthz))
        .route("/api/users", post(users::create_user_handler))
        .route("/api/login", post(auth::login_handler))
        .route("/api/refresh", post(auth::refresh_handler))
        .route("/api/revoke", post(auth::revoke_handler));

    // Routes that require a user access token
    let user_session = Router::new()
        .route("/api/users", put(users::update_user_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user,
        ));

    // Routes that require the static webhook key
    let service = Router::new()
        .route("/api/polka/webhooks", post(webhooks::polka_webhook_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_api_key,
        ));

    Router::new()
        .merge(public)
        .merge(user_session)
        .merge(service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

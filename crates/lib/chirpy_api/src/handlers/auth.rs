//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chirpy_core::auth::credentials::bearer_token;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{CredentialsRequest, LoginResponse, TokenResponse};

/// `POST /api/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<Json<LoginResponse>> {
    let session = state.sessions.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        user: session.user.into(),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// `POST /api/refresh` — exchange the refresh token in
/// `Authorization: Bearer` for a new access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<TokenResponse>> {
    let refresh_token = bearer_token(&headers)?;
    let token = state.sessions.refresh(&refresh_token).await?;
    Ok(Json(TokenResponse { token }))
}

/// `POST /api/revoke` — revoke the refresh token in `Authorization: Bearer`.
pub async fn revoke_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let refresh_token = bearer_token(&headers)?;
    state.sessions.revoke(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

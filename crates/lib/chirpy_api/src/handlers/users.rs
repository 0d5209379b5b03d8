//! User request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CredentialsRequest, UserResponse};
use crate::services::users;

/// `POST /api/users` — register a new user.
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = users::create_user(state.users.as_ref(), &body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `PUT /api/users` — change the caller's email and password.
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(principal)): Extension<AuthenticatedUser>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = users::update_user(
        state.users.as_ref(),
        principal.user_id,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(user.into()))
}

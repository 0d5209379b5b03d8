//! Authorization middleware — user-session and static-key wrappers.
//!
//! Both wrappers only read headers, optionally attach the principal to the
//! request, and either forward or answer 401.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chirpy_core::auth::credentials;
use chirpy_core::models::auth::Principal;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, UNAUTHORIZED};

/// Principal of the current request, stored in request extensions.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Principal);

/// Axum middleware: verifies `Authorization: Bearer <access-token>` and
/// injects `AuthenticatedUser` into request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = state.sessions.authenticate(request.headers())?;
    request.extensions_mut().insert(AuthenticatedUser(principal));
    Ok(next.run(request).await)
}

/// Axum middleware: checks `Authorization: ApiKey <key>` against the
/// configured webhook key. Attaches nothing to the request.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = credentials::api_key(request.headers())?;
    if !api_key_matches(&key, state.config.auth.polka_key()) {
        debug!("api key rejected");
        return Err(AppError::Unauthorized(UNAUTHORIZED.into()));
    }
    Ok(next.run(request).await)
}

/// Exact match against the configured key. An empty configured key matches
/// nothing. Comparing digests keeps the comparison time independent of where
/// the strings first differ.
fn api_key_matches(presented: &str, configured: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    Sha256::digest(presented.as_bytes()) == Sha256::digest(configured.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_must_match_exactly() {
        assert!(api_key_matches("f271c81ff7084ee5", "f271c81ff7084ee5"));
        assert!(!api_key_matches("f271c81ff7084ee", "f271c81ff7084ee5"));
        assert!(!api_key_matches("F271C81FF7084EE5", "f271c81ff7084ee5"));
    }

    #[test]
    fn empty_configured_key_matches_nothing() {
        assert!(!api_key_matches("", ""));
        assert!(!api_key_matches("anything", ""));
    }
}

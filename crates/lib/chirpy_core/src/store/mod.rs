//! Storage collaborator contract.
//!
//! The auth core never talks to a database directly. It goes through these
//! two traits, implemented by [`postgres::PgStore`] for production and
//! [`memory::MemoryStore`] for tests and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{RefreshToken, User, UserWithPassword};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// User records. The auth core only reads them; the other operations serve
/// user management.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user and their password hash by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserWithPassword>>;

    /// Create a user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User>;

    /// Replace a user's email and password hash. `None` if the user is unknown.
    async fn update_user(&self, id: Uuid, email: &str, password_hash: &str)
    -> Result<Option<User>>;

    /// Mark a user as upgraded. Returns false if the user is unknown.
    async fn upgrade_user(&self, id: Uuid) -> Result<bool>;
}

/// Opaque refresh tokens.
///
/// Implementations must make "is this token usable" and revocation atomic
/// with respect to each other: once `revoke_refresh_token` returns, no later
/// lookup may see the token as valid.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new refresh token for `user_id`.
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken>;

    /// Owner of a token that exists, is unexpired and is not revoked.
    ///
    /// Absent, expired and revoked tokens all yield `None`.
    async fn find_user_id_by_valid_refresh_token(&self, token: &str) -> Result<Option<Uuid>>;

    /// Revoke a token. Revoking an unknown or already revoked token succeeds
    /// and leaves the original revocation time in place.
    async fn revoke_refresh_token(&self, token: &str) -> Result<()>;
}

//! PostgreSQL storage backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RefreshTokenStore, Result, UserStore};
use crate::auth::queries;
use crate::models::auth::{RefreshToken, User, UserWithPassword};

/// [`UserStore`] and [`RefreshTokenStore`] over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserWithPassword>> {
        queries::find_user_by_email(&self.pool, email).await
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        queries::create_user(&self.pool, email, password_hash).await
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        queries::update_user(&self.pool, id, email, password_hash).await
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<bool> {
        queries::upgrade_user(&self.pool, id).await
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken> {
        queries::store_refresh_token(&self.pool, token, user_id, expires_at).await
    }

    async fn find_user_id_by_valid_refresh_token(&self, token: &str) -> Result<Option<Uuid>> {
        queries::find_user_id_by_valid_refresh_token(&self.pool, token).await
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<()> {
        queries::revoke_refresh_token(&self.pool, token).await
    }
}

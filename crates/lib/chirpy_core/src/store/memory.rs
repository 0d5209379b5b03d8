//! In-memory storage backend.
//!
//! Used by the test suites and for running the API without PostgreSQL.
//! Data is lost when the store is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RefreshTokenStore, Result, StoreError, UserStore};
use crate::models::auth::{RefreshToken, User, UserWithPassword};

/// In-memory [`UserStore`] and [`RefreshTokenStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserWithPassword>>,
    refresh_tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored refresh token, including revoked ones.
    pub async fn refresh_token(&self, token: &str) -> Option<RefreshToken> {
        self.refresh_tokens.read().await.get(token).cloned()
    }

    /// Overwrite a token's expiry. Lets tests age a token without waiting.
    pub async fn set_refresh_token_expiry(&self, token: &str, expires_at: DateTime<Utc>) -> bool {
        match self.refresh_tokens.write().await.get_mut(token) {
            Some(record) => {
                record.expires_at = expires_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserWithPassword>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.user.email == email).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.user.email == email) {
            return Err(StoreError::Conflict(format!("email '{email}' already registered")));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(
            user.id,
            UserWithPassword {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.user.email == email && u.user.id != id) {
            return Err(StoreError::Conflict(format!("email '{email}' already registered")));
        }
        let Some(record) = users.get_mut(&id) else {
            return Ok(None);
        };
        record.user.email = email.to_string();
        record.user.updated_at = Utc::now();
        record.password_hash = password_hash.to_string();
        Ok(Some(record.user.clone()))
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(record) => {
                record.user.is_chirpy_red = true;
                record.user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken> {
        let mut tokens = self.refresh_tokens.write().await;
        if tokens.contains_key(token) {
            return Err(StoreError::Conflict("refresh token already exists".into()));
        }
        let record = RefreshToken {
            token: token.to_string(),
            user_id,
            created_at: Utc::now(),
            expires_at,
            revoked_at: None,
        };
        tokens.insert(token.to_string(), record.clone());
        Ok(record)
    }

    async fn find_user_id_by_valid_refresh_token(&self, token: &str) -> Result<Option<Uuid>> {
        let tokens = self.refresh_tokens.read().await;
        let now = Utc::now();
        Ok(tokens
            .get(token)
            .filter(|t| t.is_usable_at(now))
            .map(|t| t.user_id))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<()> {
        let mut tokens = self.refresh_tokens.write().await;
        if let Some(record) = tokens.get_mut(token)
            && record.revoked_at.is_none()
        {
            record.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}

//! Session authority — login, refresh, revoke and per-request authentication.

use std::sync::{Arc, LazyLock};

use chrono::{Duration, Utc};
use http::HeaderMap;
use tracing::{debug, error, info};

use super::AuthError;
use super::credentials::bearer_token;
use super::jwt::AccessTokenCodec;
use super::password::{hash_password, verify_password};
use super::token::generate_refresh_token;
use crate::config::AuthConfig;
use crate::models::auth::{Principal, User};
use crate::store::{RefreshTokenStore, UserStore};

/// Access token lifetime: 1 hour.
pub const ACCESS_TOKEN_TTL: Duration = Duration::hours(1);

/// Refresh token lifetime: 60 days.
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(60);

/// Hash verified against when the email is unknown, so both login failures
/// cost one bcrypt verification.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("chirpy-login-timing-equaliser").ok());

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl Session {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user.id,
        }
    }
}

/// Issues and checks session credentials.
///
/// Holds no mutable state of its own; all shared state lives behind the
/// store traits.
pub struct SessionAuthority {
    codec: AccessTokenCodec,
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl SessionAuthority {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            codec: AccessTokenCodec::new(config.jwt_secret())?,
            users,
            refresh_tokens,
        })
    }

    /// Authenticate with email + password and open a session.
    ///
    /// Unknown email, wrong password and an unreadable stored hash all fail
    /// with `InvalidUserPassword`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let Some(record) = self.users.find_user_by_email(email).await? else {
            if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(hash, password);
            }
            debug!("login rejected: unknown email");
            return Err(AuthError::InvalidUserPassword);
        };

        let user = record.user;
        match verify_password(&record.password_hash, password) {
            Ok(()) => {}
            Err(AuthError::Hashing(e)) => {
                error!(user_id = %user.id, error = %e, "stored password hash is unreadable");
                return Err(AuthError::InvalidUserPassword);
            }
            Err(e) => {
                debug!(user_id = %user.id, error = %e, "login rejected");
                return Err(e);
            }
        }

        let access_token = self.codec.issue(user.id, ACCESS_TOKEN_TTL)?;
        let refresh_token = generate_refresh_token()?;
        self.refresh_tokens
            .create_refresh_token(&refresh_token, user.id, Utc::now() + REFRESH_TOKEN_TTL)
            .await?;

        info!(user_id = %user.id, "user logged in");
        Ok(Session {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Exchange a usable refresh token for a new access token.
    ///
    /// The refresh token itself is left as is and stays valid until it
    /// expires or is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user_id = self
            .refresh_tokens
            .find_user_id_by_valid_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::RevokedCredential)?;
        debug!(user_id = %user_id, "access token refreshed");
        self.codec.issue(user_id, ACCESS_TOKEN_TTL)
    }

    /// Revoke a refresh token. Succeeds for unknown and already revoked tokens.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.revoke_refresh_token(refresh_token).await?;
        info!("refresh token revoked");
        Ok(())
    }

    /// Resolve the caller of a request from its `Authorization: Bearer` header.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = bearer_token(headers)?;
        let user_id = self.codec.verify(&token)?;
        Ok(Principal { user_id })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::DateTime;
    use http::HeaderValue;
    use http::header::AUTHORIZATION;
    use uuid::Uuid;

    use super::*;
    use crate::models::auth::{RefreshToken, UserWithPassword};
    use crate::store::StoreError;
    use crate::store::memory::MemoryStore;

    const EMAIL: &str = "walt@breakingbad.com";
    const PASSWORD: &str = "123456";

    async fn authority_with_user(secret: &str) -> (SessionAuthority, Arc<MemoryStore>, User) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(EMAIL, &hash_password(PASSWORD).unwrap())
            .await
            .unwrap();
        let config = AuthConfig::new(secret, "polka").unwrap();
        let authority = SessionAuthority::new(&config, store.clone(), store.clone()).unwrap();
        (authority, store, user)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn login_opens_a_session() {
        let (authority, store, user) = authority_with_user("secret").await;
        let session = authority.login(EMAIL, PASSWORD).await.unwrap();

        assert_eq!(session.user, user);
        assert_eq!(session.principal().user_id, user.id);
        assert_eq!(session.refresh_token.len(), 64);

        let principal = authority.authenticate(&bearer(&session.access_token)).unwrap();
        assert_eq!(principal.user_id, user.id);

        let stored = store.refresh_token(&session.refresh_token).await.unwrap();
        assert_eq!(stored.user_id, user.id);
        let window = stored.expires_at - stored.created_at;
        assert!((window - REFRESH_TOKEN_TTL).num_seconds().abs() <= 1);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (authority, _, _) = authority_with_user("secret").await;
        let wrong_password = authority.login(EMAIL, "654321").await.unwrap_err();
        let unknown_email = authority.login("nobody@example.com", PASSWORD).await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidUserPassword));
        assert!(matches!(unknown_email, AuthError::InvalidUserPassword));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn unreadable_stored_hash_looks_like_wrong_password() {
        let (authority, store, _) = authority_with_user("secret").await;
        store
            .create_user("corrupt@example.com", "not-a-bcrypt-hash")
            .await
            .unwrap();

        let err = authority.login("corrupt@example.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidUserPassword));
    }

    #[tokio::test]
    async fn refresh_issues_access_tokens_without_rotation() {
        let (authority, _, user) = authority_with_user("secret").await;
        let session = authority.login(EMAIL, PASSWORD).await.unwrap();

        for _ in 0..2 {
            let access = authority.refresh(&session.refresh_token).await.unwrap();
            let principal = authority.authenticate(&bearer(&access)).unwrap();
            assert_eq!(principal.user_id, user.id);
        }
    }

    #[tokio::test]
    async fn revoked_token_fails_like_unknown_token() {
        let (authority, _, _) = authority_with_user("secret").await;
        let session = authority.login(EMAIL, PASSWORD).await.unwrap();

        authority.revoke(&session.refresh_token).await.unwrap();
        let revoked = authority.refresh(&session.refresh_token).await.unwrap_err();
        let unknown = authority.refresh("deadbeef").await.unwrap_err();

        assert!(matches!(revoked, AuthError::RevokedCredential));
        assert!(matches!(unknown, AuthError::RevokedCredential));
    }

    #[tokio::test]
    async fn expired_refresh_token_is_rejected() {
        let (authority, store, _) = authority_with_user("secret").await;
        let session = authority.login(EMAIL, PASSWORD).await.unwrap();
        assert!(
            store
                .set_refresh_token_expiry(&session.refresh_token, Utc::now())
                .await
        );
        assert!(matches!(
            authority.refresh(&session.refresh_token).await.unwrap_err(),
            AuthError::RevokedCredential
        ));
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (authority, _, _) = authority_with_user("secret").await;
        let session = authority.login(EMAIL, PASSWORD).await.unwrap();
        authority.revoke(&session.refresh_token).await.unwrap();
        authority.revoke(&session.refresh_token).await.unwrap();
        authority.revoke("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn authenticate_rejects_missing_and_foreign_tokens() {
        let (authority, _, _) = authority_with_user("secret").await;
        let (other, _, _) = authority_with_user("other-secret").await;
        let foreign = other.login(EMAIL, PASSWORD).await.unwrap();

        assert!(matches!(
            authority.authenticate(&HeaderMap::new()).unwrap_err(),
            AuthError::MissingCredential(_)
        ));
        assert!(matches!(
            authority.authenticate(&bearer(&foreign.access_token)).unwrap_err(),
            AuthError::InvalidSignature
        ));
    }

    /// Store whose every call fails as if the database were down.
    struct UnavailableStore;

    fn unavailable() -> StoreError {
        StoreError::Db(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl UserStore for UnavailableStore {
        async fn find_user_by_email(
            &self,
            _email: &str,
        ) -> crate::store::Result<Option<UserWithPassword>> {
            Err(unavailable())
        }
        async fn create_user(&self, _email: &str, _hash: &str) -> crate::store::Result<User> {
            Err(unavailable())
        }
        async fn update_user(
            &self,
            _id: Uuid,
            _email: &str,
            _hash: &str,
        ) -> crate::store::Result<Option<User>> {
            Err(unavailable())
        }
        async fn upgrade_user(&self, _id: Uuid) -> crate::store::Result<bool> {
            Err(unavailable())
        }
    }

    #[async_trait]
    impl RefreshTokenStore for UnavailableStore {
        async fn create_refresh_token(
            &self,
            _token: &str,
            _user_id: Uuid,
            _expires_at: DateTime<Utc>,
        ) -> crate::store::Result<RefreshToken> {
            Err(unavailable())
        }
        async fn find_user_id_by_valid_refresh_token(
            &self,
            _token: &str,
        ) -> crate::store::Result<Option<Uuid>> {
            Err(unavailable())
        }
        async fn revoke_refresh_token(&self, _token: &str) -> crate::store::Result<()> {
            Err(unavailable())
        }
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let store = Arc::new(UnavailableStore);
        let config = AuthConfig::new("secret", "polka").unwrap();
        let authority = SessionAuthority::new(&config, store.clone(), store).unwrap();

        let login = authority.login(EMAIL, PASSWORD).await.unwrap_err();
        let refresh = authority.refresh("tok").await.unwrap_err();
        let revoke = authority.revoke("tok").await.unwrap_err();
        for err in [login, refresh, revoke] {
            assert!(matches!(err, AuthError::Storage(_)));
            assert!(!err.is_credential_error());
        }
    }
}

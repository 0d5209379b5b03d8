//! Process-wide authentication settings.

use std::fmt;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT signing secret must not be empty")]
    EmptyJwtSecret,
}

/// Secrets used by the auth core. Built once at start-up and passed by
/// reference to everything that needs them.
#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    polka_key: String,
}

impl AuthConfig {
    /// An empty `polka_key` is allowed; it makes every static-key request fail.
    pub fn new(
        jwt_secret: impl Into<String>,
        polka_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        Ok(Self {
            jwt_secret,
            polka_key: polka_key.into(),
        })
    }

    /// HMAC secret for access tokens.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Static API key expected from the payment provider's webhook.
    pub fn polka_key(&self) -> &str {
        &self.polka_key
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("polka_key", &"<redacted>")
            .finish()
    }
}

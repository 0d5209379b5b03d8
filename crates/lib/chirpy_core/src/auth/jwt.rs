//! JWT access-token issuing and verification (HS256).

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::AccessTokenClaims;

/// `iss` claim written into every access token.
pub const TOKEN_ISSUER: &str = "chirpy";

/// Upper bound on the lifetime of an access token.
pub const MAX_ACCESS_TOKEN_TTL: Duration = Duration::hours(1);

/// Signs and verifies access tokens with a single shared secret.
///
/// Holds only immutable key material, so one instance can be shared by every
/// request.
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_ttl: Duration,
}

impl fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenCodec")
            .field("max_ttl", &self.max_ttl)
            .finish_non_exhaustive()
    }
}

impl AccessTokenCodec {
    /// Build a codec for `secret`, bounding token lifetimes to [`MAX_ACCESS_TOKEN_TTL`].
    pub fn new(secret: &[u8]) -> Result<Self, AuthError> {
        Self::with_max_ttl(secret, MAX_ACCESS_TOKEN_TTL)
    }

    /// Build a codec with an explicit lifetime bound.
    pub fn with_max_ttl(secret: &[u8], max_ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Signing("signing secret is empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            max_ttl,
        })
    }

    /// Issue a signed token for `subject` expiring `ttl` from now.
    ///
    /// `ttl` is clamped to the codec's maximum. Negative values are kept and
    /// produce a token that is already expired.
    pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = ttl.min(self.max_ttl);
        let claims = AccessTokenClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(format!("jwt encode: {e}")))
    }

    /// Verify a token and return its subject.
    ///
    /// A token is valid iff its signature matches and `now < exp`. The issuer
    /// is not checked.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<AccessTokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedCredential,
            })?
            .claims;

        // jsonwebtoken accepts exp == now; the token must be strictly unexpired.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::ExpiredCredential);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::MalformedCredential)
    }
}

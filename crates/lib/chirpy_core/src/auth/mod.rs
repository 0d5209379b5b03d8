//! Authentication and session-credential authority.
//!
//! Provides password hashing, opaque refresh-token generation, signed access
//! tokens, `Authorization` header extraction and the [`session::SessionAuthority`]
//! that ties them to the storage collaborator.

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod queries;
pub mod session;
pub mod token;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
///
/// The credential kinds are kept distinct for logging only. The HTTP layer
/// collapses all of them (except `MissingCredential`) into one opaque
/// "Unauthorized" response.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header, or nothing left after the scheme prefix.
    #[error("{0}")]
    MissingCredential(String),

    #[error("Malformed credential")]
    MalformedCredential,

    #[error("Credential expired")]
    ExpiredCredential,

    /// Signature mismatch. Covers both forged tokens and tokens signed with
    /// another secret.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Refresh token is unknown, expired or revoked.
    #[error("Refresh token is not usable")]
    RevokedCredential,

    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidUserPassword,

    #[error("Storage unavailable: {0}")]
    Storage(#[from] StoreError),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),
}

impl AuthError {
    /// Whether this error means "the caller is not authenticated", as opposed
    /// to an internal failure.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredential(_)
                | AuthError::MalformedCredential
                | AuthError::ExpiredCredential
                | AuthError::InvalidSignature
                | AuthError::RevokedCredential
                | AuthError::InvalidUserPassword
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_kinds_are_classified() {
        assert!(AuthError::MissingCredential("no token provided".into()).is_credential_error());
        assert!(AuthError::ExpiredCredential.is_credential_error());
        assert!(AuthError::InvalidSignature.is_credential_error());
        assert!(AuthError::RevokedCredential.is_credential_error());
        assert!(AuthError::InvalidUserPassword.is_credential_error());
    }

    #[test]
    fn internal_kinds_are_not_credential_errors() {
        assert!(!AuthError::Signing("bad key".into()).is_credential_error());
        assert!(!AuthError::Hashing("cost".into()).is_credential_error());
        assert!(!AuthError::EntropyUnavailable("getrandom".into()).is_credential_error());
        assert!(
            !AuthError::Storage(StoreError::Conflict("dup".into())).is_credential_error()
        );
    }

    #[test]
    fn missing_credential_displays_its_message() {
        let err = AuthError::MissingCredential("no api key provided".into());
        assert_eq!(err.to_string(), "no api key provided");
    }
}

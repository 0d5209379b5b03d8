//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt cost factor. Changing it only affects newly hashed passwords.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10).
///
/// The salt is random per call, so hashing the same password twice yields
/// two different strings.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Hashing(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// Uses bcrypt's own verify, never a string comparison of two hashes.
/// Returns `InvalidUserPassword` when the password does not match.
pub fn verify_password(hash: &str, password: &str) -> Result<(), AuthError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::InvalidUserPassword),
        Err(e) => Err(AuthError::Hashing(format!("bcrypt verify: {e}"))),
    }
}

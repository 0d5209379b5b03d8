//! Opaque refresh-token generation.

use rand::TryRngCore;
use rand::rngs::OsRng;
use tracing::error;

use super::AuthError;

/// Number of random bytes in a refresh token (64 hex chars).
const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a refresh token: 32 bytes from the OS random source, lowercase hex.
///
/// Fails instead of falling back to a weaker generator when the OS source
/// is unavailable.
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        error!(error = %e, "OS random source failed");
        AuthError::EntropyUnavailable(e.to_string())
    })?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn token_is_64_lowercase_hex_chars() {
        let token = generate_refresh_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..10_000)
            .map(|_| generate_refresh_token().unwrap())
            .collect();
        assert_eq!(tokens.len(), 10_000);
    }
}

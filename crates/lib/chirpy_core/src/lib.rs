//! # chirpy_core
//!
//! Authentication core for Chirpy: passwords, access and refresh tokens,
//! credential extraction, and the storage contracts behind them.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}

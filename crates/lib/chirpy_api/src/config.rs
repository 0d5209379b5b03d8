//! API server configuration.

use chirpy_core::config::AuthConfig;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL. Unused when serving from memory.
    pub database_url: String,
    /// Signing secret and static webhook key.
    pub auth: AuthConfig,
}

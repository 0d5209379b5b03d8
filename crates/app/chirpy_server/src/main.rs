//! Chirpy API server binary.

use std::sync::Arc;

use chirpy_api::config::ApiConfig;
use chirpy_core::config::AuthConfig;
use chirpy_core::store::memory::MemoryStore;
use chirpy_core::store::postgres::PgStore;
use chirpy_core::store::{RefreshTokenStore, UserStore};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "chirpy_server", about = "Chirpy API server")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/chirpy"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// HMAC secret for access tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// API key expected from the Polka payment webhook.
    #[arg(long, env = "POLKA_KEY", default_value = "", hide_env_values = true)]
    polka_key: String,

    /// Serve from an in-memory store instead of PostgreSQL. Data is lost on exit.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chirpy_api=debug,chirpy_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let auth = AuthConfig::new(args.jwt_secret, args.polka_key)?;
    if auth.polka_key().is_empty() {
        warn!("POLKA_KEY is empty; webhook requests will be rejected");
    }

    let config = ApiConfig {
        bind_addr: format!("0.0.0.0:{}", args.port),
        database_url: args.database_url,
        auth,
    };

    let (users, refresh_tokens): (Arc<dyn UserStore>, Arc<dyn RefreshTokenStore>) =
        if args.in_memory {
            info!("using in-memory store");
            let store = Arc::new(MemoryStore::new());
            (
                store.clone() as Arc<dyn UserStore>,
                store as Arc<dyn RefreshTokenStore>,
            )
        } else {
            info!(max_connections = args.max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(&config.database_url)
                .await?;

            info!("running database migrations");
            chirpy_core::migrate::migrate(&pool).await?;

            let store = Arc::new(PgStore::new(pool));
            (
                store.clone() as Arc<dyn UserStore>,
                store as Arc<dyn RefreshTokenStore>,
            )
        };

    let state = chirpy_api::AppState::new(config.clone(), users, refresh_tokens)?;
    let app = chirpy_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

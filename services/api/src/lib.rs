//! FixIt Hub API service
//!
//! Citizens report local infrastructure problems as issues; admins triage
//! them, manage admin accounts and read contact messages. State lives in
//! PostgreSQL when `DATABASE_URL` is set and in memory otherwise.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod passwords;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod uploads;
pub mod validation;

pub use config::AppConfig;
pub use routes::create_router;
pub use state::AppState;

use anyhow::{Context, Result};
use common::database::{DatabaseConfig, init_pool, run_migrations};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Build the application state from configuration and the environment.
///
/// Connects to PostgreSQL and applies migrations when `DATABASE_URL` is set.
pub async fn build_state(config: AppConfig) -> Result<AppState> {
    let state = match DatabaseConfig::from_env()? {
        Some(db_config) => {
            let pool = init_pool(&db_config).await?;
            run_migrations(&pool).await?;
            info!("Connected to PostgreSQL");
            AppState::postgres(config, pool)?
        }
        None => {
            warn!("DATABASE_URL is not set; records are kept in memory and lost on restart");
            AppState::in_memory(config)?
        }
    };

    bootstrap::ensure_bootstrap_admin(&state).await?;
    Ok(state)
}

/// Serve the API until the process is stopped
pub async fn run(config: AppConfig) -> Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = build_state(config).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

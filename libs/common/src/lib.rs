//! Common library for the FixIt Hub backend
//!
//! This crate provides the storage plumbing shared by the FixIt Hub services:
//! PostgreSQL configuration and pooling, the embedded schema migrations and
//! the storage error type.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     if let Some(config) = DatabaseConfig::from_env()? {
//!         let pool = init_pool(&config).await?;
//!         run_migrations(&pool).await?;
//!         println!("Database health check: {}", health_check(&pool).await);
//!     }
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;

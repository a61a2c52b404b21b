//! Application state shared across handlers

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    passwords::Passwords,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{
        ContactRepository, IssueRepository, MemoryContactRepository, MemoryIssueRepository,
        MemoryUserRepository, PgContactRepository, PgIssueRepository, PgUserRepository,
        UserRepository,
    },
    session::SessionService,
    uploads::{DiskImageStore, ImageStore},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionService,
    pub passwords: Passwords,
    pub login_limiter: RateLimiter,
    pub issues: Arc<dyn IssueRepository>,
    pub users: Arc<dyn UserRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub images: Arc<dyn ImageStore>,
    /// Present when running against PostgreSQL
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(config: AppConfig, pool: PgPool) -> Result<Self> {
        Self::build(
            config,
            Arc::new(PgIssueRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgContactRepository::new(pool.clone())),
            Some(pool),
        )
    }

    /// State backed by the in-memory repositories
    pub fn in_memory(config: AppConfig) -> Result<Self> {
        Self::build(
            config,
            Arc::new(MemoryIssueRepository::new()),
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryContactRepository::new()),
            None,
        )
    }

    fn build(
        config: AppConfig,
        issues: Arc<dyn IssueRepository>,
        users: Arc<dyn UserRepository>,
        contacts: Arc<dyn ContactRepository>,
        db_pool: Option<PgPool>,
    ) -> Result<Self> {
        let passwords = Passwords::new(
            config.password_memory_kib,
            config.password_iterations,
            config.password_parallelism,
        )?;

        Ok(Self {
            sessions: SessionService::from_config(&config),
            passwords,
            login_limiter: RateLimiter::new(RateLimiterConfig::from(&config)),
            issues,
            users,
            contacts,
            images: Arc::new(DiskImageStore::new(config.upload_dir.clone())),
            db_pool,
            config: Arc::new(config),
        })
    }
}

//! Service configuration
//!
//! Values come from built-in defaults overridden by `FIXIT_*` environment
//! variables, e.g. `FIXIT_BIND_ADDR=127.0.0.1:8080`. Database settings are
//! read separately by [`common::database::DatabaseConfig::from_env`].

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;

/// Runtime configuration for the API service
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Secret used to sign session tokens. A random one is generated when unset.
    pub session_secret: Option<String>,
    /// Session lifetime in seconds (default: 7 days)
    pub session_ttl_seconds: u64,
    /// Set the `Secure` attribute on the session cookie
    pub cookie_secure: bool,
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
    /// Login attempts allowed per e-mail inside the window
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
    pub login_ban_seconds: u64,
    /// Argon2 memory cost in KiB
    pub password_memory_kib: u32,
    /// Argon2 iteration count
    pub password_iterations: u32,
    /// Argon2 lanes
    pub password_parallelism: u32,
    /// Seed admin created at startup when the e-mail is not registered yet
    pub bootstrap_admin_name: String,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            session_secret: None,
            session_ttl_seconds: 60 * 60 * 24 * 7,
            cookie_secure: false,
            upload_dir: PathBuf::from("./data/uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
            login_max_attempts: 5,
            login_window_seconds: 300,
            login_ban_seconds: 900,
            password_memory_kib: argon2::Params::DEFAULT_M_COST,
            password_iterations: argon2::Params::DEFAULT_T_COST,
            password_parallelism: argon2::Params::DEFAULT_P_COST,
            bootstrap_admin_name: "Administrator".to_string(),
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults and `FIXIT_*` environment variables
    pub fn load() -> Result<Self> {
        let defaults = AppConfig::default();

        let settings = Config::builder()
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("session_ttl_seconds", defaults.session_ttl_seconds as i64)?
            .set_default("cookie_secure", defaults.cookie_secure)?
            .set_default("upload_dir", defaults.upload_dir.to_string_lossy().to_string())?
            .set_default("max_upload_bytes", defaults.max_upload_bytes as i64)?
            .set_default("login_max_attempts", i64::from(defaults.login_max_attempts))?
            .set_default("login_window_seconds", defaults.login_window_seconds as i64)?
            .set_default("login_ban_seconds", defaults.login_ban_seconds as i64)?
            .set_default("password_memory_kib", i64::from(defaults.password_memory_kib))?
            .set_default("password_iterations", i64::from(defaults.password_iterations))?
            .set_default("password_parallelism", i64::from(defaults.password_parallelism))?
            .set_default("bootstrap_admin_name", defaults.bootstrap_admin_name)?
            // Values stay strings; numeric and bool fields convert on deserialize
            .add_source(Environment::with_prefix("FIXIT"))
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid FIXIT_* configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl_seconds == 0 {
            anyhow::bail!("session_ttl_seconds must be greater than zero");
        }
        if self.login_max_attempts == 0 {
            anyhow::bail!("login_max_attempts must be greater than zero");
        }
        if self.bootstrap_admin_email.is_some() != self.bootstrap_admin_password.is_some() {
            anyhow::bail!(
                "bootstrap_admin_email and bootstrap_admin_password must be set together"
            );
        }
        Ok(())
    }
}

//! First-admin seeding at startup

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    models::{NewUser, Role, user::normalize_email},
    state::AppState,
};

/// Create the configured bootstrap admin unless that e-mail is already registered.
///
/// Returns true when an account was created.
pub async fn ensure_bootstrap_admin(state: &AppState) -> Result<bool> {
    let (Some(email), Some(password)) = (
        state.config.bootstrap_admin_email.as_deref(),
        state.config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(false);
    };

    let email = normalize_email(email);
    if state.users.find_by_email(&email).await?.is_some() {
        info!("Bootstrap admin {} already exists", email);
        return Ok(false);
    }

    let password_hash = state
        .passwords
        .hash_blocking(password)
        .await
        .context("Failed to hash bootstrap admin password")?;

    let admin = state
        .users
        .create(NewUser {
            name: state.config.bootstrap_admin_name.trim().to_string(),
            email,
            password_hash,
            role: Role::Admin,
        })
        .await?;

    info!("Created bootstrap admin {}", admin.id);
    Ok(true)
}

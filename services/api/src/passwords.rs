//! Password hashing with Argon2id

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use std::sync::Arc;
use tracing::{error, warn};

/// Hashes and verifies account passwords
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
    /// Hash of a random secret, checked when the account does not exist
    decoy_hash: Arc<str>,
}

impl Passwords {
    /// Create a hasher with explicit cost parameters
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow::anyhow!("Invalid Argon2 parameters: {}", e))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_secret = SaltString::generate(&mut rand::thread_rng());
        let decoy_hash = hash_with(&argon2, decoy_secret.as_str())?;

        Ok(Self {
            argon2,
            decoy_hash: decoy_hash.into(),
        })
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String> {
        hash_with(&self.argon2, password)
    }

    /// [`Passwords::hash`] on the blocking pool
    pub async fn hash_blocking(&self, password: &str) -> Result<String> {
        let passwords = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))?
    }

    /// Check a login attempt on the blocking pool.
    ///
    /// Without a stored hash the password is checked against the decoy, so a
    /// missing account costs the same Argon2 work as a wrong password.
    pub async fn verify_blocking(&self, password: &str, stored_hash: Option<&str>) -> bool {
        let passwords = self.clone();
        let password = password.to_string();
        let stored_hash = stored_hash.map(str::to_string);

        let result = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => passwords.verify(&password, &hash),
            None => {
                passwords.verify(&password, &passwords.decoy_hash);
                false
            }
        })
        .await;

        result.unwrap_or_else(|e| {
            error!("Password verification task failed: {}", e);
            false
        })
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// An unparseable stored hash never verifies.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

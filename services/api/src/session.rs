//! Session tokens carried in the `auth-token` cookie
//!
//! The cookie holds an HS256-signed token naming the account. A token that
//! fails signature or expiry validation is treated as no session at all.

use anyhow::Result;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{Role, User};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "auth-token";

/// Claims stored in a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Issues and validates session tokens and builds the matching cookies
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
    secure_cookie: bool,
}

impl SessionService {
    /// Initialize a new session service
    pub fn new(secret: &[u8], ttl_seconds: u64, secure_cookie: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
            secure_cookie,
        }
    }

    /// Build the service from configuration.
    ///
    /// Without a configured secret a random one is generated, so sessions do
    /// not survive a restart.
    pub fn from_config(config: &AppConfig) -> Self {
        match config.session_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Self::new(
                secret.as_bytes(),
                config.session_ttl_seconds,
                config.cookie_secure,
            ),
            _ => {
                warn!("FIXIT_SESSION_SECRET is not set; using a per-process random secret");
                let mut secret = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                Self::new(&secret, config.session_ttl_seconds, config.cookie_secure)
            }
        }
    }

    /// Generate a session token for a user
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = SessionClaims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + self.ttl_seconds,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Cookie carrying a freshly issued token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(self.ttl_seconds as i64))
            .build()
    }

    /// Cookie that removes the session from the browser
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::ZERO)
            .build()
    }
}

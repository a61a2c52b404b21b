//! Rate limiter for preventing brute force attacks on login

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed logins tolerated per window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,       // 5 minutes
            ban_duration_seconds: 900, // 15 minutes
        }
    }
}

impl From<&AppConfig> for RateLimiterConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.login_max_attempts,
            window_seconds: config.login_window_seconds,
            ban_duration_seconds: config.login_ban_seconds,
        }
    }
}

/// Attempts recorded for one login e-mail
#[derive(Debug)]
struct LoginAttempts {
    count: u32,
    last_attempt: Instant,
    banned_until: Option<Instant>,
}

impl LoginAttempts {
    /// Nothing left to remember once the window and any ban have run out
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        let ban_over = self.banned_until.is_none_or(|until| now >= until);
        ban_over && now.saturating_duration_since(self.last_attempt) >= window
    }
}

#[derive(Debug)]
struct Ledger {
    attempts: HashMap<String, LoginAttempts>,
    last_sweep: Instant,
}

/// Per-key attempt counter with temporary bans
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    ledger: Arc<Mutex<Ledger>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            ledger: Arc::new(Mutex::new(Ledger {
                attempts: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Instant::now()).await
    }

    async fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        let window = Duration::from_secs(self.config.window_seconds);
        let mut ledger = self.ledger.lock().await;

        // Keys are caller-chosen e-mails, so the map is swept once per window
        if now.saturating_duration_since(ledger.last_sweep) >= window {
            let before = ledger.attempts.len();
            ledger.attempts.retain(|_, a| !a.is_stale(now, window));
            ledger.last_sweep = now;
            debug!(
                "Pruned {} stale login keys",
                before - ledger.attempts.len()
            );
        }

        let entry = ledger
            .attempts
            .entry(key.to_string())
            .or_insert(LoginAttempts {
                count: 0,
                last_attempt: now,
                banned_until: None,
            });

        if let Some(until) = entry.banned_until {
            if now < until {
                return false;
            }
            entry.count = 0;
            entry.banned_until = None;
        }

        if now.saturating_duration_since(entry.last_attempt) >= window {
            entry.count = 0;
        }

        if entry.count >= self.config.max_attempts {
            entry.banned_until = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.count += 1;
        entry.last_attempt = now;

        true
    }

    /// Forget all attempts for `key`, e.g. after a successful login
    pub async fn reset(&self, key: &str) {
        self.ledger.lock().await.attempts.remove(key);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.ledger.lock().await.attempts.len()
    }
}

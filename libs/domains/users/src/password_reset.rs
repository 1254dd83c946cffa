//! Outstanding password reset requests.
//!
//! A request moves `NoRequest -> Requested -> Consumed`, or expires once it is
//! older than [`PasswordResetConfig::ttl_minutes`]. Only the SHA-256 digest of
//! the token is stored; the raw token goes to the user through a [`ResetNotifier`].

use argon2::password_hash::rand_core::{OsRng, RngCore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::UserResult;

#[derive(Debug, Clone)]
pub struct PasswordResetConfig {
    pub ttl_minutes: i64,
    /// Base link; the token and email are appended as query parameters
    pub reset_url: String,
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 60,
            reset_url: "http://localhost:8080/reset-password".to_string(),
        }
    }
}

impl FromEnv for PasswordResetConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            ttl_minutes: env_parse_or_default("PASSWORD_RESET_TTL_MINUTES", defaults.ttl_minutes)?,
            reset_url: env_or_default("PASSWORD_RESET_URL", &defaults.reset_url),
        })
    }
}

impl PasswordResetConfig {
    /// Query values are percent-encoded.
    pub fn link_for(&self, email: &str, token: &str) -> String {
        format!(
            "{}?token={}&email={}",
            self.reset_url,
            urlencoding::encode(token),
            urlencoding::encode(email)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasswordReset {
    /// Lowercased
    pub email: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(email: &str, token: &str) -> Self {
        Self {
            email: email.to_lowercase(),
            token_hash: hash_token(token),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl_minutes: i64) -> bool {
        Utc::now() - self.created_at > Duration::minutes(ttl_minutes)
    }

    /// Digest comparison of the presented token against the stored one.
    pub fn matches(&self, token: &str) -> bool {
        let presented = hash_token(token);
        presented.len() == self.token_hash.len()
            && presented
                .bytes()
                .zip(self.token_hash.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    const_hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    const_hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store `reset`, replacing any earlier request for the same email
    async fn upsert(&self, reset: PasswordReset) -> UserResult<()>;

    async fn find(&self, email: &str) -> UserResult<Option<PasswordReset>>;

    /// Atomically remove the request for `email` if `token` is its token and
    /// return it. Of two callers presenting the same token only one gets `Some`.
    async fn consume(&self, email: &str, token: &str) -> UserResult<Option<PasswordReset>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPasswordResetRepository {
    resets: Arc<RwLock<HashMap<String, PasswordReset>>>,
}

impl InMemoryPasswordResetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryPasswordResetRepository {
    async fn upsert(&self, reset: PasswordReset) -> UserResult<()> {
        self.resets.write().await.insert(reset.email.clone(), reset);
        Ok(())
    }

    async fn find(&self, email: &str) -> UserResult<Option<PasswordReset>> {
        Ok(self.resets.read().await.get(&email.to_lowercase()).cloned())
    }

    async fn consume(&self, email: &str, token: &str) -> UserResult<Option<PasswordReset>> {
        let mut resets = self.resets.write().await;
        let key = email.to_lowercase();
        if !resets.get(&key).is_some_and(|reset| reset.matches(token)) {
            return Ok(None);
        }
        Ok(resets.remove(&key))
    }
}

/// Delivers the reset link to the user.
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_link(&self, email: &str, link: &str) -> UserResult<()>;
}

/// Writes the link to the log instead of sending mail.
#[derive(Debug, Default, Clone)]
pub struct LogResetNotifier;

#[async_trait]
impl ResetNotifier for LogResetNotifier {
    async fn send_reset_link(&self, email: &str, link: &str) -> UserResult<()> {
        tracing::info!(email = %email, link = %link, "Password reset link issued");
        Ok(())
    }
}

/// Keeps every sent link in memory so tests can read the token back.
#[derive(Debug, Default, Clone)]
pub struct CapturingResetNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl CapturingResetNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(email, link)` pairs in send order
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    /// Token from the most recent link sent to `email`
    pub async fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(to, _)| to.eq_ignore_ascii_case(email))
            .and_then(|(_, link)| {
                link.split(['?', '&'])
                    .find_map(|part| part.strip_prefix("token="))
                    .map(str::to_string)
            })
    }
}

#[async_trait]
impl ResetNotifier for CapturingResetNotifier {
    async fn send_reset_link(&self, email: &str, link: &str) -> UserResult<()> {
        self.sent.lock().await.push((email.to_string(), link.to_string()));
        Ok(())
    }
}

use super::AuthError;
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Set of token ids (`jti`) that are still allowed through the auth gate.
///
/// A token is usable only while its id is active; logout and refresh revoke it.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn activate(&self, jti: &str, subject: &str, ttl_seconds: u64) -> Result<(), AuthError>;

    async fn is_active(&self, jti: &str) -> Result<bool, AuthError>;

    /// Removes the id; `true` only for the caller that actually removed a
    /// live entry, so concurrent revokes of one token have a single winner.
    async fn revoke(&self, jti: &str) -> Result<bool, AuthError>;

    /// Backend reachability, used by the readiness probe.
    async fn ping(&self) -> Result<(), AuthError>;
}

/// Redis-backed store, one `jwt:active:{jti}` key per token expiring with it.
#[derive(Clone)]
pub struct RedisTokenStore {
    client: ConnectionManager,
}

impl RedisTokenStore {
    pub fn new(manager: ConnectionManager) -> Self {
        tracing::info!("Redis token store initialized");
        Self { client: manager }
    }

    fn key(jti: &str) -> String {
        format!("jwt:active:{}", jti)
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn activate(&self, jti: &str, subject: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        let mut conn = self.client.clone();
        conn.set_ex::<_, _, ()>(Self::key(jti), subject, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn is_active(&self, jti: &str) -> Result<bool, AuthError> {
        let mut conn = self.client.clone();
        let exists: bool = conn.exists(Self::key(jti)).await?;
        Ok(exists)
    }

    async fn revoke(&self, jti: &str) -> Result<bool, AuthError> {
        let mut conn = self.client.clone();
        let removed: i64 = conn.del(Self::key(jti)).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), AuthError> {
        let mut conn = self.client.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Process-local store for single-instance deployments and tests.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    active: Arc<RwLock<HashMap<String, Instant>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn activate(&self, jti: &str, _subject: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        let mut active = self.active.write().await;
        let now = Instant::now();
        active.retain(|_, expires_at| *expires_at > now);
        active.insert(jti.to_string(), now + Duration::from_secs(ttl_seconds));
        Ok(())
    }

    async fn is_active(&self, jti: &str) -> Result<bool, AuthError> {
        let active = self.active.read().await;
        Ok(active
            .get(jti)
            .is_some_and(|expires_at| *expires_at > Instant::now()))
    }

    async fn revoke(&self, jti: &str) -> Result<bool, AuthError> {
        let removed = self.active.write().await.remove(jti);
        Ok(removed.is_some_and(|expires_at| expires_at > Instant::now()))
    }

    async fn ping(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

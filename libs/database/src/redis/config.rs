#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_required};

/// Redis connection settings
#[derive(Clone, Debug)]
pub struct RedisConfig {
    /// Full connection URL, credentials and database index included
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}

/// Reads `REDIS_URL`.
#[cfg(feature = "config")]
impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(env_required("REDIS_URL")?))
    }
}

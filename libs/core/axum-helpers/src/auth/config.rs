use core_config::{ConfigError, FromEnv, env_parse_or_default, env_required};

const MIN_SECRET_LEN: usize = 32;

/// Signing secret and token lifetime.
///
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_TTL_MINUTES` (default 60)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, ttl_minutes: u64) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self { secret, ttl_minutes })
    }

    /// Token lifetime in seconds, as reported in `expires_in`.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_minutes * 60
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        let ttl_minutes = env_parse_or_default("JWT_TTL_MINUTES", 60u64)?;
        Self::new(secret, ttl_minutes)
    }
}

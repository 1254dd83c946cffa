use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse_or_default, server::ServerConfig};
use domain_products::StorageConfig;
use domain_users::PasswordResetConfig;

// Import database configs from the database library
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    /// Token store backend; tokens live in process memory when unset
    pub redis: Option<RedisConfig>,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub password_reset: PasswordResetConfig,
    pub storage: StorageConfig,
    pub run_migrations: bool,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let redis = match std::env::var("REDIS_URL") {
            Ok(url) if !url.trim().is_empty() => Some(RedisConfig::new(url)),
            _ => None,
        };

        Ok(Self {
            app: app_info!(),
            database,
            redis,
            server,
            environment,
            jwt: JwtConfig::from_env()?,
            password_reset: PasswordResetConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            run_migrations: env_parse_or_default("RUN_MIGRATIONS", false)?,
        })
    }
}

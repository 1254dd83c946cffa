//! Redis connection management

mod config;
mod connector;

pub use config::RedisConfig;
pub use connector::{check_health, connect, connect_from_config_with_retry};

pub use redis::aio::ConnectionManager;
pub use redis::{AsyncCommands, RedisResult};

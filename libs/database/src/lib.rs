//! Connection management for the catalog's backing stores.
//!
//! - [`postgres`]: SeaORM pool with env-driven sizing, retrying connect, health probe
//! - [`redis`]: `ConnectionManager` for the token store, retrying connect, health probe
//! - [`common`]: shared error type and exponential backoff
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{PostgresConfig, connect_from_config_with_retry};
//!
//! let db = connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};

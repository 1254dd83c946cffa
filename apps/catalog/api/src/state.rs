//! Application state management.

use axum_helpers::{JwtAuth, TokenStore};
use std::sync::Arc;

/// Shared application state, cloned into every router (Arc/pool clones only).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Active-token registry backing `jwt`, Redis or in-memory
    pub token_store: Arc<dyn TokenStore>,
    pub jwt: JwtAuth,
}

impl AppState {
    pub fn new(
        config: crate::config::Config,
        db: database::postgres::DatabaseConnection,
        token_store: Arc<dyn TokenStore>,
    ) -> Self {
        let jwt = JwtAuth::new(&config.jwt, Arc::clone(&token_store));
        Self {
            config,
            db,
            token_store,
            jwt,
        }
    }
}

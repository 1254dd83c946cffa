//! Catalog API: authentication, users and products under `/api/v1`.

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

pub use config::Config;
pub use state::AppState;

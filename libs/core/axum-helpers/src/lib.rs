//! # Axum Helpers
//!
//! Building blocks shared by the HTTP services in this workspace.
//!
//! - **[`auth`]**: bearer token issuing/verification and the auth gate middleware
//! - **[`errors`]**: [`AppError`] and the JSON [`ErrorResponse`] body
//! - **[`extractors`]**: [`ValidatedJson`] and [`UuidPath`]
//! - **[`pagination`]**: [`Page`] envelope and [`PageQuery`]
//! - **[`http`]**: CORS and security headers
//! - **[`server`]**: router assembly, health checks, graceful shutdown

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod pagination;
pub mod server;

pub use auth::{
    AuthError, InMemoryTokenStore, IssuedToken, JwtAuth, JwtClaims, JwtConfig, RedisTokenStore,
    TokenStore, bearer_token, jwt_auth_middleware,
};
pub use errors::{AppError, ErrorCode, ErrorResponse, validation_details};
pub use extractors::{UuidPath, ValidatedJson};
pub use pagination::{MAX_PAGE, PER_PAGE, Page, PageLink, PageQuery};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

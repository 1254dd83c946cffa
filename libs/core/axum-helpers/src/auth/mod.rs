//! Bearer token issuing, verification and the auth gate.
//!
//! ```ignore
//! let config = JwtConfig::from_env()?;
//! let auth = JwtAuth::new(&config, Arc::new(InMemoryTokenStore::new()));
//!
//! let protected = Router::new()
//!     .route("/users", get(list_users))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod store;

pub use config::JwtConfig;
pub use error::AuthError;
pub use jwt::{IssuedToken, JwtAuth, JwtClaims};
pub use middleware::{bearer_token, jwt_auth_middleware};
pub use store::{InMemoryTokenStore, RedisTokenStore, TokenStore};

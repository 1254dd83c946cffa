//! Users Domain
//!
//! Credential store, token-based authentication and the user directory.
//!
//! # Features
//!
//! - Registration with per-field validation (unique email and username)
//! - Login/logout/refresh on top of [`axum_helpers::JwtAuth`]
//! - Password hashing with Argon2
//! - Password reset flow with single-use, expiring tokens
//! - Paginated user listing, patch updates, hard delete
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  handlers / auth_handlers    │  ← HTTP endpoints
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │  AuthService / UserService   │  ← Business logic, hashing, reset flow
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │ UserRepository               │  ← Data access (trait + implementations)
//! │ PasswordResetRepository      │
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │            Models            │  ← Entities, DTOs
//! └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum_helpers::{InMemoryTokenStore, JwtAuth, JwtConfig};
//! use domain_users::*;
//!
//! let users = UserService::new(InMemoryUserRepository::new());
//! let jwt = JwtAuth::new(
//!     &JwtConfig::new("0123456789abcdef0123456789abcdef", 60).unwrap(),
//!     Arc::new(InMemoryTokenStore::new()),
//! );
//! let auth = AuthService::new(
//!     users.clone(),
//!     jwt,
//!     InMemoryPasswordResetRepository::new(),
//!     Arc::new(LogResetNotifier),
//!     PasswordResetConfig::default(),
//! );
//!
//! let router = auth_handlers::router(auth).nest("/users", handlers::router(users));
//! ```

pub mod auth;
pub mod auth_handlers;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password_reset;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::AuthService;
pub use error::{UserError, UserResult};
pub use models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterResponse, RegisterUser,
    ResetPasswordRequest, UpdateUser, User, UserResponse,
};
pub use password_reset::{
    CapturingResetNotifier, InMemoryPasswordResetRepository, LogResetNotifier, PasswordReset,
    PasswordResetConfig, PasswordResetRepository, ResetNotifier,
};
pub use postgres::{PostgresPasswordResetRepository, PostgresUserRepository};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;

use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, AuthError};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("The {0} has already been taken")]
    AlreadyTaken(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired password reset token")]
    InvalidResetToken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Field error reported when a unique column already holds the value.
pub fn taken(field: &'static str) -> ValidationError {
    ValidationError::new("unique").with_message(format!("The {} has already been taken.", field).into())
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => {
                tracing::debug!(user_id = %id, "User not found");
                AppError::NotFound("Not Found".to_string())
            }
            UserError::Validation(errors) => AppError::ValidationError(errors),
            UserError::AlreadyTaken(field) => {
                let mut errors = ValidationErrors::new();
                errors.add(field, taken(field));
                AppError::ValidationError(errors)
            }
            UserError::InvalidCredentials => AppError::Unauthorized("Unauthorized".to_string()),
            UserError::InvalidResetToken => {
                AppError::Unauthorized("This password reset token is invalid.".to_string())
            }
            UserError::Auth(e) => e.into(),
            UserError::Database(e) => AppError::Database(e),
            UserError::PasswordHash(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

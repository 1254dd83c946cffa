use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Image storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Multipart body rejected: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => {
                tracing::debug!(product_id = %id, "Product not found");
                AppError::NotFound("Not Found".to_string())
            }
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::Storage(StorageError::UnsupportedExtension(_)) => AppError::field(
                "image",
                "mimes",
                "The image must be a file of type: pdf, jpg, png.",
            ),
            ProductError::Storage(StorageError::Io(e)) => AppError::Io(e),
            ProductError::Multipart(e) => AppError::Multipart(e),
            ProductError::MultipartRejection(e) => AppError::MultipartRejection(e),
            ProductError::Database(e) => AppError::Database(e),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

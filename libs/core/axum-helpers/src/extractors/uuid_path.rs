use crate::errors::{AppError, ErrorCode, ErrorResponse};
use axum::{
    Json,
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Single `{id}` path segment parsed as a UUID.
///
/// A segment that is not a UUID is rejected with 400 `INVALID_UUID`.
///
/// ```ignore
/// async fn delete_user(UuidPath(id): UuidPath) -> StatusCode { .. }
///
/// Router::new().route("/users/{id}", delete(delete_user));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()).into_response())?;

        Uuid::parse_str(&id).map(UuidPath).map_err(|_| {
            tracing::debug!(id = %id, "Rejected non-UUID path id");
            let body = ErrorResponse::new(ErrorCode::InvalidUuid, format!("Invalid UUID: {}", id));
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        })
    }
}

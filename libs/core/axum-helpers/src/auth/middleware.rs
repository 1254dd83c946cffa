use super::{AuthError, JwtAuth};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Token from an `Authorization: Bearer <token>` header, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Auth gate for protected routes.
///
/// Verifies the `Authorization: Bearer` token and inserts [`JwtClaims`](super::JwtClaims)
/// into request extensions; anything else is a 401.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/me", post(me))
///     .layer(axum::middleware::from_fn_with_state(auth.clone(), jwt_auth_middleware));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!("No bearer token in Authorization header");
        return Err(AuthError::MissingToken);
    };

    let claims = auth.verify(token).await?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

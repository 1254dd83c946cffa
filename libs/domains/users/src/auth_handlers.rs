//! Authentication endpoints.
//!
//! `login`, `register`, `forgot-password`, `reset-password` and `refresh` are
//! public (refresh reads the bearer token itself); `logout` and `me` sit
//! behind [`jwt_auth_middleware`].

use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuthError, IssuedToken, JwtClaims, ValidatedJson, bearer_token,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::AuthService;
use crate::error::{UserError, UserResult};
use crate::models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterResponse, RegisterUser,
    ResetPasswordRequest, UserResponse,
};
use crate::password_reset::PasswordResetRepository;
use crate::repository::UserRepository;

pub const TAG: &str = "auth";

#[derive(OpenApi)]
#[openapi(
    paths(login, logout, refresh, me, register, forgot_password, reset_password),
    components(
        schemas(
            LoginRequest,
            IssuedToken,
            RegisterUser,
            RegisterResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            MessageResponse,
            UserResponse
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Tokens, registration and password reset")
    )
)]
pub struct ApiDoc;

pub fn router<R, P>(service: AuthService<R, P>) -> Router
where
    R: UserRepository + 'static,
    P: PasswordResetRepository + 'static,
{
    let jwt = service.jwt().clone();
    let shared_service = Arc::new(service);

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware));

    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/register", post(register))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .merge(protected)
        .with_state(shared_service)
}

type SharedAuth<R, P> = State<Arc<AuthService<R, P>>>;

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = IssuedToken),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn login<R: UserRepository, P: PasswordResetRepository>(
    State(service): SharedAuth<R, P>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<IssuedToken>> {
    let token = service.login(input).await?;
    Ok(Json(token))
}

/// Revoke the presented token
#[utoipa::path(
    post,
    path = "/logout",
    tag = TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn logout<R: UserRepository, P: PasswordResetRepository>(
    State(service): SharedAuth<R, P>,
    Extension(claims): Extension<JwtClaims>,
) -> UserResult<Json<MessageResponse>> {
    service.logout(&claims).await?;
    Ok(Json(MessageResponse::new("Successfully logged out")))
}

/// Trade a valid token for a fresh one; the old token stops working
#[utoipa::path(
    post,
    path = "/refresh",
    tag = TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token refreshed", body = IssuedToken),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn refresh<R: UserRepository, P: PasswordResetRepository>(
    State(service): SharedAuth<R, P>,
    headers: HeaderMap,
) -> UserResult<Json<IssuedToken>> {
    let token = bearer_token(&headers).ok_or(UserError::Auth(AuthError::MissingToken))?;
    let issued = service.refresh(token).await?;
    Ok(Json(issued))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn me<R: UserRepository, P: PasswordResetRepository>(
    State(service): SharedAuth<R, P>,
    Extension(claims): Extension<JwtClaims>,
) -> UserResult<Json<UserResponse>> {
    let user = service.me(&claims).await?;
    Ok(Json(user))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository, P: PasswordResetRepository>(
    State(service): SharedAuth<R, P>,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully.".to_string(),
            user,
        }),
    ))
}

/// Request a password reset link. Succeeds whether or not the email is registered.
#[utoipa::path(
    post,
    path = "/forgot-password",
    tag = TAG,
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn forgot_password<R: UserRepository, P: PasswordResetRepository>(
    State(service): SharedAuth<R, P>,
    ValidatedJson(input): ValidatedJson<ForgotPasswordRequest>,
) -> UserResult<Json<MessageResponse>> {
    service.forgot_password(input).await?;
    Ok(Json(MessageResponse::new("Reset password link sent on your email.")))
}

/// Set a new password using a reset token
#[utoipa::path(
    post,
    path = "/reset-password",
    tag = TAG,
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn reset_password<R: UserRepository, P: PasswordResetRepository>(
    State(service): SharedAuth<R, P>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> UserResult<Json<MessageResponse>> {
    service.reset_password(input).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

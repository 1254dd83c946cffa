use axum::{Router, middleware, routing::get};
use axum_helpers::jwt_auth_middleware;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod products;
pub mod users;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Auth endpoints sit at the version root and gate `logout`/`me` themselves;
/// everything under `/users` and `/products` requires a bearer token.
pub fn routes(state: &AppState) -> Router {
    let gate = middleware::from_fn_with_state(state.jwt.clone(), jwt_auth_middleware);

    let v1 = Router::new()
        .merge(auth::router(state))
        .nest("/users", users::router(state).layer(gate.clone()))
        .nest("/products", products::router(state).layer(gate));

    Router::new().nest("/v1", v1)
}

/// Router with the `/ready` endpoint, merged next to the stateless app router.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

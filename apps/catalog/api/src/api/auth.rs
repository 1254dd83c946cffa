use axum::Router;
use domain_users::{
    AuthService, LogResetNotifier, PostgresPasswordResetRepository, PostgresUserRepository,
    UserService, auth_handlers,
};
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let users = UserService::new(PostgresUserRepository::new(state.db.clone()));
    let service = AuthService::new(
        users,
        state.jwt.clone(),
        PostgresPasswordResetRepository::new(state.db.clone()),
        Arc::new(LogResetNotifier),
        state.config.password_reset.clone(),
    );
    auth_handlers::router(service)
}

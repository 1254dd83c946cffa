//! Products API routes

use axum::Router;
use domain_products::{LocalImageStorage, PostgresProductRepository, ProductService, handlers};
use std::sync::Arc;

use crate::state::AppState;

/// Create products router; images are written under `IMAGE_STORAGE_DIR`
pub fn router(state: &AppState) -> Router {
    let repository = PostgresProductRepository::new(state.db.clone());
    let images = Arc::new(LocalImageStorage::from_config(&state.config.storage));
    handlers::router(ProductService::new(repository, images))
}

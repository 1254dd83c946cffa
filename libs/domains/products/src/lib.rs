//! Products Domain
//!
//! Product catalog backed by PostgreSQL, with uploaded images kept on disk.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart parsing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, image lifecycle
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼────┐ ┌▼─────────────┐
//! │ Repo  │ │ ImageStorage │  ← Rows / files (trait + implementations)
//! └──┬────┘ └──────────────┘
//!    │
//! ┌──▼──────────┐
//! │   Models    │  ← Entities, forms
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_products::{
//!     handlers,
//!     postgres::PostgresProductRepository,
//!     service::ProductService,
//!     storage::LocalImageStorage,
//! };
//!
//! # async fn example(db: sea_orm::DatabaseConnection) {
//! let repository = PostgresProductRepository::new(db);
//! let images = Arc::new(LocalImageStorage::new("public/images"));
//! let service = ProductService::new(repository, images);
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! # }
//! ```

pub mod error;
pub mod form;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use form::{ALLOWED_EXTENSIONS, ImageUpload, ProductForm};
pub use handlers::ApiDoc;
pub use models::{NewProduct, Product, ProductChanges, SearchQuery};
pub use postgres::PostgresProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
pub use storage::{
    ImageStorage, InMemoryImageStorage, LocalImageStorage, StorageConfig, StorageError,
};

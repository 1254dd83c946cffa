//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, OriginalUri, Query, State},
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    Page, PageQuery, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ProductResult;
use crate::form::ProductForm;
use crate::models::{Product, SearchQuery};
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const TAG: &str = "products";

/// Upper bound on a product form, image included
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, create_product, update_product, delete_product, search_products),
    components(
        schemas(Product, ProductUpload, Page<Product>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalog")
    )
)]
pub struct ApiDoc;

/// Multipart body accepted by create and update (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
struct ProductUpload {
    #[schema(example = 111)]
    sku: i64,
    name: String,
    quantity: i32,
    #[schema(example = 499.99)]
    price: f64,
    description: String,
    /// pdf, jpg or png
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Products router. Expects to be mounted behind the auth gate.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/{id}", post(update_product).delete(delete_product))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(shared_service)
}

/// List products, newest first, 10 per page
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of products", body = Page<Product>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
) -> ProductResult<Json<Page<Product>>> {
    let page = service.list_products(&query, uri.path()).await?;
    Ok(Json(page))
}

/// Create a product from a multipart form with an image
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<Json<Product>> {
    let form = ProductForm::from_multipart(multipart?).await?;
    let product = service.create_product(form).await?;
    Ok(Json(product))
}

/// Update a product; omitted fields keep their value, a new image replaces the old one
#[utoipa::path(
    post,
    path = "/{id}",
    tag = TAG,
    params(("id" = uuid::Uuid, Path, description = "Product id")),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<Json<Product>> {
    let form = ProductForm::from_multipart(multipart?).await?;
    let product = service.update_product(id, form).await?;
    Ok(Json(product))
}

/// Delete a product and its image
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = uuid::Uuid, Path, description = "Product id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Products whose name contains `name` and whose SKU contains `sku`
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Matching products", body = Vec<Product>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<SearchQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.search_products(&query).await?;
    Ok(Json(products))
}

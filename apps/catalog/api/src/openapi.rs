//! OpenAPI documentation configuration

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "bearer_auth".to_string(),
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token from `POST /login`"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::ErrorCode)
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "User accounts, bearer authentication and a product catalog with image uploads"
    ),
    servers(
        (url = "/api/v1", description = "API base path")
    ),
    modifiers(&BearerSecurity),
    nest(
        (path = "/users", api = domain_users::handlers::ApiDoc),
        (path = "/products", api = domain_products::ApiDoc)
    )
)]
struct CatalogDoc;

/// Combined document: catalog resources plus the auth endpoints mounted at the root.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = CatalogDoc::openapi();
        doc.merge(domain_users::auth_handlers::ApiDoc::openapi());
        doc
    }
}

//! `OpenAPI` (3.1) specification generation for `folio-api`.
//!
//! The generated spec is served at `/api/v1/openapi.json` and can be used
//! to generate external clients and to detect breaking API changes in CI.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// `OpenAPI` documentation for the Folio REST API (`/api/v1/*`).
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API",
        description = "Folio book catalog REST API"
    ),
    paths(
        crate::routes::books::list_books,
        crate::routes::books::get_book,
        crate::routes::books::create_book,
        crate::routes::books::update_book,
        crate::routes::books::delete_book,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::routes::books::CreateBookRequest,
            crate::routes::books::UpdateBookRequest,
            crate::routes::books::BookResponse,
            crate::routes::books::ListBooksResponse,
            crate::routes::books::DeleteBookResponse,
        )
    ),
    tags(
        (name = "books", description = "Book catalog operations"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Returns the generated `OpenAPI` spec.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Serves the generated `OpenAPI` spec as JSON.
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_every_book_route() {
        let spec = openapi();
        let paths: Vec<&str> = spec.paths.paths.keys().map(String::as_str).collect();
        assert!(paths.contains(&"/api/v1/books"));
        assert!(paths.contains(&"/api/v1/books/{bookId}"));
    }

    #[test]
    fn spec_serializes_to_json() {
        let json = serde_json::to_string(&openapi()).expect("spec should serialize");
        assert!(json.contains("\"Folio API\""));
    }
}

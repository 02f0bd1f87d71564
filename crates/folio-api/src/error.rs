//! API error types and HTTP response mapping.

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use folio_catalog::CatalogError;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// One entry in the error payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorDetail {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable message (safe for clients).
    pub message: String,
}

/// Standard JSON error response body.
///
/// Every failure crosses the boundary as `{ "errors": [ { code, message } ] }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    /// The failures for this request; always at least one entry.
    pub errors: Vec<ApiErrorDetail>,
}

/// HTTP API error with stable machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl ApiError {
    /// Returns an error response for a malformed query parameter.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", message)
    }

    /// Returns an error response for a malformed mutation field.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
    }

    /// Returns an error response for authentication failures.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Returns an error response when the bearer token is invalid.
    #[must_use]
    pub fn invalid_token() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_TOKEN",
            "Invalid bearer token",
        )
    }

    /// Returns an error response for authorization failures.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// Returns an error response for missing records.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Returns an error response for duplicate records.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// Returns an internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }

    /// Returns an error response when the record store is unreachable.
    ///
    /// The message is fixed; store failure detail stays in the logs.
    #[must_use]
    pub fn store_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "STORE_UNAVAILABLE",
            "The catalog is temporarily unavailable",
        )
    }

    /// Attaches a request ID for correlation.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the human-readable error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the request ID, if one was attached.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = self.request_id;
        let mut response = (
            self.status,
            Json(ApiErrorBody {
                errors: vec![ApiErrorDetail {
                    code: self.code.to_string(),
                    message: self.message,
                }],
            }),
        )
            .into_response();

        if let Some(request_id) = request_id {
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), value);
            }
        }

        response
    }
}

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::InvalidQuery { message } => Self::invalid_query(message),
            CatalogError::InvalidInput { message } => Self::invalid_input(message),
            CatalogError::NotFound { entity, .. } => {
                Self::not_found(format!("Could not find a {entity} by this id"))
            }
            CatalogError::Conflict { entity, name } => {
                Self::conflict(format!("{entity} already exists: {name}"))
            }
            CatalogError::Forbidden { message } => Self::forbidden(message),
            CatalogError::Unauthorized => Self::unauthorized("Authentication required"),
            CatalogError::StoreUnavailable { message } => {
                tracing::error!(error = %message, "record store unavailable");
                Self::store_unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        let cases = [
            (
                ApiError::from(CatalogError::invalid_query("bad page")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(CatalogError::invalid_input("bad rating")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(CatalogError::not_found("book", "id")),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(CatalogError::conflict("book", "Dune")),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(CatalogError::forbidden("nope")),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(CatalogError::Unauthorized),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status);
        }
    }

    #[test]
    fn store_failures_hide_internal_detail() {
        let error = ApiError::from(CatalogError::StoreUnavailable {
            message: "connection refused to 10.0.0.3:6000".to_string(),
        });

        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!error.message().contains("10.0.0.3"));
    }

    #[test]
    fn response_carries_request_id_header() {
        let error = ApiError::not_found("gone").with_request_id("req-42");
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let header = response
            .headers()
            .get("x-request-id")
            .expect("x-request-id header should be present");
        assert_eq!(header.to_str().unwrap(), "req-42");
    }
}

//! API server implementation.
//!
//! Provides health, ready, and API endpoints for the Folio catalog.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use folio_catalog::{BookFilter, BookStore, MemoryBookStore};
use folio_core::Result;

use crate::config::{Config, CorsConfig};

// ============================================================================
// Health and Ready Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
    /// Optional message about readiness state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Record store holding the catalog.
    store: Arc<dyn BookStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &"<BookStore>")
            .finish()
    }
}

impl AppState {
    /// Creates new application state with the given record store.
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn BookStore>) -> Self {
        Self { config, store }
    }

    /// Creates new application state with an in-memory store (for testing).
    #[must_use]
    pub fn with_memory_store(config: Config) -> Self {
        Self {
            config,
            store: Arc::new(MemoryBookStore::new()),
        }
    }

    /// Returns the record store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn BookStore> {
        Arc::clone(&self.store)
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint handler.
///
/// Returns 200 OK if the service is alive. This is a shallow check
/// that doesn't verify dependencies.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check endpoint handler.
///
/// Returns 200 OK if the service is ready to accept requests.
/// A count over the base filter is enough to validate the store path.
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store().count(&BookFilter::default()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                message: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                ready: false,
                message: Some(format!("store check failed: {e}")),
            }),
        ),
    }
}

// ============================================================================
// Server
// ============================================================================

/// The Folio API server.
pub struct Server {
    config: Config,
    store: Arc<dyn BookStore>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("store", &"<BookStore>")
            .finish()
    }
}

impl Server {
    /// Creates a new server with the given configuration.
    ///
    /// Defaults to an in-memory store; use `with_store` for an external
    /// backend.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: Arc::new(MemoryBookStore::new()),
        }
    }

    /// Creates a new server with an explicit record store.
    #[must_use]
    pub fn with_store(config: Config, store: Arc<dyn BookStore>) -> Self {
        Self { config, store }
    }

    /// Creates a new `ServerBuilder`.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the router with all routes and middleware.
    fn create_router(&self) -> Router {
        let state = Arc::new(AppState::new(self.config.clone(), Arc::clone(&self.store)));

        let cors = self.build_cors_layer();
        let context_layer =
            middleware::from_fn_with_state(Arc::clone(&state), crate::context::context_middleware);

        Router::new()
            // Health, ready, and spec endpoints (no auth required)
            .route("/health", get(health))
            .route("/ready", get(ready))
            .route("/api/v1/openapi.json", get(crate::openapi::serve_openapi))
            // API routes (caller resolution via context middleware)
            .nest("/api/v1", crate::routes::api_v1_routes().layer(context_layer))
            // Middleware (order matters): trace outermost, then CORS.
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            // Shared state
            .with_state(state)
    }

    /// Builds the CORS layer from configuration.
    fn build_cors_layer(&self) -> CorsLayer {
        let cors_config = &self.config.cors;
        let cors = Self::build_cors_base(cors_config);
        Self::apply_cors_allowed_origins(cors, cors_config)
    }

    fn build_cors_base(cors_config: &CorsConfig) -> CorsLayer {
        CorsLayer::new()
            // Allow common methods for REST API + preflight
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            // Allow common headers including auth
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::ACCEPT,
                // Custom headers for debug identities and correlation
                header::HeaderName::from_static("x-user-id"),
                header::HeaderName::from_static("x-role"),
                header::HeaderName::from_static("x-request-id"),
            ])
            // Expose headers the browser needs to read
            .expose_headers([
                header::CONTENT_TYPE,
                header::CONTENT_LENGTH,
                header::HeaderName::from_static("x-request-id"),
            ])
            // Set max age for preflight caching
            .max_age(Duration::from_secs(cors_config.max_age_seconds))
    }

    fn cors_allows_any_origin(cors_config: &CorsConfig) -> bool {
        cors_config.allowed_origins.len() == 1
            && cors_config
                .allowed_origins
                .first()
                .is_some_and(|origin| origin == "*")
    }

    fn parse_cors_origins(cors_config: &CorsConfig) -> Vec<HeaderValue> {
        let mut allowed = Vec::new();
        for origin in &cors_config.allowed_origins {
            match HeaderValue::from_str(origin) {
                Ok(value) => allowed.push(value),
                Err(_) => {
                    tracing::error!(
                        origin = %origin,
                        "Invalid CORS origin; expected a valid HeaderValue"
                    );
                }
            }
        }
        allowed
    }

    fn apply_cors_allowed_origins(cors: CorsLayer, cors_config: &CorsConfig) -> CorsLayer {
        if cors_config.allowed_origins.is_empty() {
            return cors;
        }

        if Self::cors_allows_any_origin(cors_config) {
            return cors.allow_origin(Any);
        }

        if cors_config
            .allowed_origins
            .iter()
            .any(|origin| origin == "*")
        {
            tracing::error!(
                origins = ?cors_config.allowed_origins,
                "Invalid CORS config: '*' must be the only allowed origin"
            );
            return cors;
        }

        let allowed = Self::parse_cors_origins(cors_config);

        if allowed.is_empty() {
            tracing::warn!("All configured CORS origins were invalid; disabling CORS");
            cors
        } else {
            tracing::info!(origins = ?cors_config.allowed_origins, "CORS configured");
            cors.allow_origin(AllowOrigin::list(allowed))
        }
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the server
    /// cannot bind to the port.
    pub async fn serve(&self) -> Result<()> {
        self.config.validate()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = self.create_router();

        tracing::info!(
            http_port = self.config.http_port,
            debug = self.config.debug,
            "Starting Folio API server"
        );

        let listener =
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| folio_core::Error::Internal {
                    message: format!("failed to bind to {addr}: {e}"),
                })?;

        axum::serve(listener, router)
            .await
            .map_err(|e| folio_core::Error::Internal {
                message: format!("server error: {e}"),
            })?;

        Ok(())
    }

    /// Creates a test router for the server.
    ///
    /// This is useful for integration tests where you want to test
    /// the routes without actually binding to a port.
    ///
    /// # Note
    ///
    /// This method is intended for testing only. It creates a router
    /// using this server's configured store (default: in-memory).
    #[doc(hidden)]
    pub fn test_router(&self) -> Router {
        self.create_router()
    }
}

/// Builder for constructing a server.
pub struct ServerBuilder {
    config: Config,
    store: Arc<dyn BookStore>,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("store", &"<BookStore>")
            .finish()
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    /// Creates a new builder with default configuration and an in-memory
    /// store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            store: Arc::new(MemoryBookStore::new()),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets debug mode.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Replaces the record store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn BookStore>) -> Self {
        self.store = store;
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        Server::with_store(self.config, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_memory_store() {
        let server = ServerBuilder::new().debug(true).build();
        assert!(server.config().debug);
    }

    #[test]
    fn wildcard_must_be_the_only_origin() {
        let cors_config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            max_age_seconds: 60,
        };
        assert!(Server::cors_allows_any_origin(&cors_config));

        let cors_config = CorsConfig {
            allowed_origins: vec!["*".to_string(), "https://a.example".to_string()],
            max_age_seconds: 60,
        };
        assert!(!Server::cors_allows_any_origin(&cors_config));
    }

    #[test]
    fn invalid_origins_are_dropped() {
        let cors_config = CorsConfig {
            allowed_origins: vec!["https://ok.example".to_string(), "bad\norigin".to_string()],
            max_age_seconds: 60,
        };
        let parsed = Server::parse_cors_origins(&cors_config);
        assert_eq!(parsed.len(), 1);
    }
}

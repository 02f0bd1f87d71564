//! # folio-api
//!
//! HTTP composition layer for the Folio catalog service.
//!
//! This crate provides the API surface for Folio, handling:
//!
//! - **Authentication**: Caller identity and role resolution
//! - **Routing**: HTTP endpoint configuration
//! - **Service Wiring**: Composition of the catalog reader and writer
//! - **Observability**: Structured logs, request IDs, health checks
//!
//! ## Design Principles
//!
//! This crate is a **thin composition layer** with no domain policy.
//! All business logic lives in `folio-catalog`.
//!
//! ## Endpoints
//!
//! ```text
//! GET    /health                    - Health check
//! GET    /ready                     - Readiness check
//! GET    /api/v1/openapi.json       - OpenAPI document
//! GET    /api/v1/books              - List books (filter/sort/paginate)
//! GET    /api/v1/books/{bookId}     - Get a book
//! POST   /api/v1/books              - Create a book (admin)
//! PATCH  /api/v1/books/{bookId}     - Update a book (admin)
//! DELETE /api/v1/books/{bookId}     - Delete a book (admin)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_api::config::Config;
//! use folio_api::server::Server;
//!
//! let server = Server::new(Config::from_env()?);
//! server.serve().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::Server;
}

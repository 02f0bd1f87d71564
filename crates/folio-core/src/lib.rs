//! # folio-core
//!
//! Core abstractions for the Folio catalog service.
//!
//! This crate provides the foundational types used across all Folio
//! components:
//!
//! - **Identifiers**: Strongly-typed ULID ids for catalog records
//! - **Error Types**: Shared error definitions and result types
//! - **Observability**: Logging initialization and span helpers
//!
//! ## Crate Boundary
//!
//! `folio-core` is the **only** crate allowed to define shared primitives.
//! Domain policy lives in `folio-catalog`; HTTP composition lives in
//! `folio-api`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod observability;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use folio_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::id::BookId;
    pub use crate::observability::{init_logging, LogFormat};
}

pub use error::{Error, Result};
pub use id::BookId;
pub use observability::{init_logging, LogFormat};

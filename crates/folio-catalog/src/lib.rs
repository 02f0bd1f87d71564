//! # folio-catalog
//!
//! Catalog domain for the Folio inventory service.
//!
//! This crate implements all catalog policy:
//!
//! - **Query Planner**: Translates untrusted filter/sort/pagination
//!   parameters into a bounded, validated [`query::QuerySpec`]
//! - **Catalog Reader**: Executes planned queries and assembles paginated
//!   results
//! - **Authorization Gate**: Role-based allow/deny for mutation classes
//! - **Guarded Mutation Workflow**: Ordered precondition checks
//!   (uniqueness/existence, authorization, validation) in front of every
//!   write
//! - **Record Store**: The durable-collection abstraction plus an
//!   in-memory backend
//!
//! ## Architecture
//!
//! The store is the only shared resource; the reader and writer hold no
//! cross-request state of their own. Title uniqueness is enforced inside
//! the store's write path, so two racing creates resolve to one success
//! and one conflict.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use folio_catalog::prelude::*;
//!
//! let store = Arc::new(MemoryBookStore::new());
//! let reader = CatalogReader::new(store.clone());
//!
//! let spec = plan_query(&params)?;
//! let page = reader.list(&spec).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod authz;
pub mod book;
pub mod error;
pub mod mutation;
pub mod query;
pub mod reader;
pub mod store;

// Re-export main types at crate root
pub use authz::{authorize, CallerIdentity, MutationClass, Role};
pub use book::{Book, BookPatch, NewBook};
pub use error::{CatalogError, Result};
pub use mutation::CatalogWriter;
pub use query::{plan_query, BookFilter, ListParams, PageSpec, QuerySpec, SortKey, SortOrder, SortSpec};
pub use reader::{BookPage, CatalogReader};
pub use store::{BookStore, MemoryBookStore};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::authz::{authorize, CallerIdentity, MutationClass, Role};
    pub use crate::book::{Book, BookPatch, NewBook};
    pub use crate::error::{CatalogError, Result};
    pub use crate::mutation::CatalogWriter;
    pub use crate::query::{plan_query, ListParams, QuerySpec};
    pub use crate::reader::{BookPage, CatalogReader};
    pub use crate::store::{BookStore, MemoryBookStore};
}

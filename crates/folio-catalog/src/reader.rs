//! Catalog read operations.
//!
//! The reader executes a planned query against the record store: one
//! paged fetch plus one independent count over the same filter, assembled
//! into a page with derived pagination metadata.

use std::fmt;
use std::sync::Arc;

use folio_core::BookId;

use crate::book::Book;
use crate::error::{CatalogError, Result};
use crate::query::QuerySpec;
use crate::store::BookStore;

/// A page of catalog records plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct BookPage {
    /// Records on this page.
    pub books: Vec<Book>,
    /// Total pages for the filter at this page size; 0 when nothing matches.
    pub total_pages: u64,
    /// The page that was requested, whether or not it holds records.
    pub current_page: u64,
}

/// Reader for catalog queries.
#[derive(Clone)]
pub struct CatalogReader {
    store: Arc<dyn BookStore>,
}

impl fmt::Debug for CatalogReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogReader")
            .field("store", &"<BookStore>")
            .finish()
    }
}

impl CatalogReader {
    /// Creates a new reader over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Executes a planned query and assembles the paginated result.
    ///
    /// The count runs against the same filter as the fetch but ignores
    /// pagination, so `total_pages` reflects the whole match set. A page
    /// past the end yields an empty record list, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::StoreUnavailable` if the store fails.
    pub async fn list(&self, spec: &QuerySpec) -> Result<BookPage> {
        let books = self.store.find(&spec.filter, spec.sort, spec.page).await?;
        let total = self.store.count(&spec.filter).await?;

        Ok(BookPage {
            books,
            total_pages: total.div_ceil(spec.page.limit),
            current_page: spec.page.page,
        })
    }

    /// Fetches a single record by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no record has this id.
    pub async fn get(&self, id: BookId) -> Result<Book> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("book", id))
    }
}

//! Record store abstraction for the catalog.
//!
//! This module defines the durable-collection contract the engine runs
//! against, plus an in-memory backend. The store provides per-record
//! atomicity but no multi-record transactions; title uniqueness is
//! enforced inside the store's write path so concurrent duplicate creates
//! resolve to one success and one conflict.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use folio_core::{BookId, Error, Result};

use crate::book::{Book, NewBook};
use crate::query::{BookFilter, PageSpec, SortKey, SortOrder, SortSpec};

/// The durable collection of catalog records.
///
/// All backends implement this trait; the in-memory backend below is the
/// only one shipped in-tree. Durable backends are plugged in from outside.
#[async_trait]
pub trait BookStore: Send + Sync + 'static {
    /// Returns the requested page of records matching `filter`.
    ///
    /// Skips `page.skip()` matches and returns at most `page.limit`.
    /// Without a sort the backend's own order applies; for this crate's
    /// backend that is id order (creation time).
    async fn find(
        &self,
        filter: &BookFilter,
        sort: Option<SortSpec>,
        page: PageSpec,
    ) -> Result<Vec<Book>>;

    /// Counts every record matching `filter`, ignoring pagination.
    async fn count(&self, filter: &BookFilter) -> Result<u64>;

    /// Fetches a record by id. Returns `None` if absent.
    async fn get(&self, id: BookId) -> Result<Option<Book>>;

    /// Exact, case-sensitive title lookup.
    async fn find_by_title(&self, title: &str) -> Result<Option<Book>>;

    /// Inserts a record, assigning its identity and timestamps.
    ///
    /// Returns `Error::AlreadyExists` if another record holds the title.
    async fn insert(&self, book: NewBook) -> Result<Book>;

    /// Replaces the record with `book.id`, bumping `updated_at`.
    ///
    /// Returns `Error::ResourceNotFound` if the record is gone and
    /// `Error::AlreadyExists` if the title collides with another record.
    async fn update(&self, book: Book) -> Result<Book>;

    /// Removes a record. Succeeds even if the record is absent (idempotent).
    async fn delete(&self, id: BookId) -> Result<()>;
}

/// In-memory record store.
///
/// Thread-safe via `RwLock`. Not durable; intended for tests and local
/// development.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: RwLock<HashMap<BookId, Book>>,
}

impl MemoryBookStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> Error {
    Error::Internal {
        message: "lock poisoned".into(),
    }
}

fn sort_books(books: &mut [Book], sort: SortSpec) {
    books.sort_by(|a, b| {
        let ordering = match sort.key {
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Price => a.price.total_cmp(&b.price),
            SortKey::Rating => a.rating.total_cmp(&b.rating),
            SortKey::Stock => a.stock.cmp(&b.stock),
        };
        match sort.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find(
        &self,
        filter: &BookFilter,
        sort: Option<SortSpec>,
        page: PageSpec,
    ) -> Result<Vec<Book>> {
        let mut matched: Vec<Book> = {
            let books = self.books.read().map_err(|_| poisoned())?;
            books.values().filter(|b| filter.matches(b)).cloned().collect()
        };

        match sort {
            Some(spec) => sort_books(&mut matched, spec),
            None => matched.sort_by_key(|b| b.id),
        }

        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, filter: &BookFilter) -> Result<u64> {
        let books = self.books.read().map_err(|_| poisoned())?;
        Ok(books.values().filter(|b| filter.matches(b)).count() as u64)
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>> {
        let books = self.books.read().map_err(|_| poisoned())?;
        Ok(books.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>> {
        let books = self.books.read().map_err(|_| poisoned())?;
        Ok(books.values().find(|b| b.title == title).cloned())
    }

    async fn insert(&self, book: NewBook) -> Result<Book> {
        let mut books = self.books.write().map_err(|_| poisoned())?;

        // Unique title index; checked under the write lock so racing
        // inserts cannot both pass.
        if books.values().any(|b| b.title == book.title) {
            return Err(Error::already_exists("book", book.title));
        }

        let now = Utc::now();
        let record = Book {
            id: BookId::generate(),
            title: book.title,
            description: book.description,
            price: book.price,
            stock: book.stock,
            category: book.category,
            author: book.author,
            rating: book.rating,
            created_at: now,
            updated_at: now,
        };
        books.insert(record.id, record.clone());
        drop(books);

        Ok(record)
    }

    async fn update(&self, book: Book) -> Result<Book> {
        let mut books = self.books.write().map_err(|_| poisoned())?;

        if !books.contains_key(&book.id) {
            return Err(Error::resource_not_found("book", book.id));
        }
        if books
            .values()
            .any(|b| b.id != book.id && b.title == book.title)
        {
            return Err(Error::already_exists("book", book.title));
        }

        let mut record = book;
        record.updated_at = Utc::now();
        books.insert(record.id, record.clone());
        drop(books);

        Ok(record)
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        self.books.write().map_err(|_| poisoned())?.remove(&id);
        Ok(())
    }
}

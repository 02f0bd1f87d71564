//! Guarded mutation workflow.
//!
//! Create, update, and delete share one shape: a fixed sequence of
//! preconditions in front of the write, where the first failing check is
//! returned and later checks never run. The order is
//! uniqueness/existence, then authorization, then field validation --
//! matching the documented behavior that a missing record reports
//! `NotFound` before the caller's role is ever consulted.

use std::fmt;
use std::sync::Arc;

use folio_core::BookId;

use crate::authz::{authorize, CallerIdentity, MutationClass};
use crate::book::{Book, BookPatch, NewBook};
use crate::error::{CatalogError, Result};
use crate::store::BookStore;

/// Writer running the guarded mutation workflow over the record store.
#[derive(Clone)]
pub struct CatalogWriter {
    store: Arc<dyn BookStore>,
}

impl fmt::Debug for CatalogWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogWriter")
            .field("store", &"<BookStore>")
            .finish()
    }
}

impl CatalogWriter {
    /// Creates a new writer over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Creates a record.
    ///
    /// Precondition order: title uniqueness, authorization, field
    /// validation, insert. The store re-checks uniqueness inside its
    /// write path, so a racing create that slips past the first lookup
    /// still resolves to `Conflict`.
    ///
    /// # Errors
    ///
    /// `Conflict` on a duplicate title, `Unauthorized`/`Forbidden` from
    /// the gate, `InvalidInput` on a constraint violation,
    /// `StoreUnavailable` if the store fails.
    pub async fn create(
        &self,
        caller: Option<&CallerIdentity>,
        book: NewBook,
    ) -> Result<Book> {
        if let Some(existing) = self.store.find_by_title(&book.title).await? {
            return Err(CatalogError::conflict("book", existing.title));
        }

        let caller = authorize(caller, MutationClass::Create)?;
        book.validate()?;

        let created = self.store.insert(book).await?;
        tracing::info!(
            book_id = %created.id,
            title = %created.title,
            user_id = %caller.user_id,
            "created book"
        );
        Ok(created)
    }

    /// Updates a record in place.
    ///
    /// Precondition order: existence, authorization, validated merge,
    /// write. Only supplied fields change.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is unknown, `Unauthorized`/`Forbidden` from
    /// the gate, `InvalidInput` on a constraint violation, `Conflict` if
    /// a supplied title collides, `StoreUnavailable` if the store fails.
    pub async fn update(
        &self,
        caller: Option<&CallerIdentity>,
        id: BookId,
        patch: BookPatch,
    ) -> Result<Book> {
        let Some(mut book) = self.store.get(id).await? else {
            return Err(CatalogError::not_found("book", id));
        };

        let caller = authorize(caller, MutationClass::Update)?;
        patch.validate()?;
        patch.apply(&mut book);

        let updated = self.store.update(book).await?;
        tracing::info!(
            book_id = %updated.id,
            user_id = %caller.user_id,
            "updated book"
        );
        Ok(updated)
    }

    /// Deletes a record.
    ///
    /// Precondition order: existence, authorization, removal.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is unknown, `Unauthorized`/`Forbidden` from
    /// the gate, `StoreUnavailable` if the store fails.
    pub async fn delete(&self, caller: Option<&CallerIdentity>, id: BookId) -> Result<()> {
        if self.store.get(id).await?.is_none() {
            return Err(CatalogError::not_found("book", id));
        }

        let caller = authorize(caller, MutationClass::Delete)?;

        self.store.delete(id).await?;
        tracing::info!(book_id = %id, user_id = %caller.user_id, "deleted book");
        Ok(())
    }
}

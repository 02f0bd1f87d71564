//! Error types for folio-catalog operations.

use std::fmt;

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
///
/// Every failure a request can hit maps onto exactly one of these
/// categories; the HTTP layer translates them to status codes without
/// inspecting messages.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A listing query parameter was malformed or out of range.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Description of the rejected parameter.
        message: String,
    },

    /// A mutation field value was malformed or out of range.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected field.
        message: String,
    },

    /// No record exists at the given identifier.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The type of record that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A record with the same unique key already exists.
    #[error("{entity} already exists: {name}")]
    Conflict {
        /// The type of record that collided.
        entity: &'static str,
        /// The unique key value that collided.
        name: String,
    },

    /// The caller is authenticated but lacks the required role.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Description of the missing privilege.
        message: String,
    },

    /// No resolvable caller identity was supplied.
    #[error("authentication required")]
    Unauthorized,

    /// The record store failed; the request cannot be served.
    #[error("store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the store failure (not exposed to clients).
        message: String,
    },
}

impl CatalogError {
    /// Creates an invalid-query error.
    #[must_use]
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates an invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(entity: &'static str, name: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            name: name.into(),
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

impl From<folio_core::Error> for CatalogError {
    fn from(value: folio_core::Error) -> Self {
        use folio_core::Error as CoreError;

        match value {
            CoreError::InvalidId { message } | CoreError::InvalidInput(message) => {
                Self::InvalidInput { message }
            }
            CoreError::ResourceNotFound { resource_type, id } => Self::NotFound {
                entity: resource_type,
                id,
            },
            CoreError::AlreadyExists { entity, name } => Self::Conflict { entity, name },
            CoreError::Storage { message, .. }
            | CoreError::Serialization { message }
            | CoreError::Internal { message } => Self::StoreUnavailable { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_collapse_to_store_unavailable() {
        let err: CatalogError = folio_core::Error::storage("backend offline").into();
        assert!(matches!(err, CatalogError::StoreUnavailable { .. }));

        let err: CatalogError = folio_core::Error::internal("lock poisoned").into();
        assert!(matches!(err, CatalogError::StoreUnavailable { .. }));
    }

    #[test]
    fn already_exists_maps_to_conflict() {
        let err: CatalogError = folio_core::Error::already_exists("book", "Dune").into();
        assert!(matches!(
            err,
            CatalogError::Conflict { entity: "book", ref name } if name == "Dune"
        ));
    }

    #[test]
    fn not_found_keeps_entity_and_id() {
        let err: CatalogError = folio_core::Error::resource_not_found("book", "abc").into();
        assert!(matches!(
            err,
            CatalogError::NotFound { entity: "book", ref id } if id == "abc"
        ));
    }
}

//! Role-based authorization for catalog mutations.
//!
//! Roles form a closed enumeration; there is no numeric privilege flag
//! and nothing unrecognized is ever treated as elevated. The gate fails
//! closed: a caller that could not be resolved is unauthorized.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Caller role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// An ordinary authenticated caller; may read, never mutate.
    Standard,
    /// An elevated caller; may create, update, and delete records.
    Admin,
}

impl Role {
    /// Parses a role name. Unrecognized values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "standard" => Some(Self::Standard),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns true for the admin role.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// An authenticated caller, resolved by the surrounding transport.
///
/// The gate only reads this; it never mutates or persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Stable user identifier.
    pub user_id: String,
    /// The caller's role.
    pub role: Role,
}

/// The class of mutation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationClass {
    /// Insert a new record.
    Create,
    /// Modify an existing record.
    Update,
    /// Remove an existing record.
    Delete,
}

impl MutationClass {
    fn verb(self) -> &'static str {
        match self {
            Self::Create => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Allows the mutation iff the caller resolved to an admin.
///
/// Every mutation class requires the same privilege; there is no
/// finer-grained permission model.
///
/// # Errors
///
/// Returns `CatalogError::Unauthorized` when no identity was resolved and
/// `CatalogError::Forbidden` when the caller is not an admin.
pub fn authorize(
    caller: Option<&CallerIdentity>,
    class: MutationClass,
) -> Result<&CallerIdentity> {
    let caller = caller.ok_or(CatalogError::Unauthorized)?;
    if !caller.role.is_admin() {
        return Err(CatalogError::forbidden(format!(
            "only admin can {} books",
            class.verb()
        )));
    }
    Ok(caller)
}

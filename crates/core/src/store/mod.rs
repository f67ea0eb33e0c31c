//! Storage abstraction for snippets.
//!
//! The lifecycle service only talks to a [`SnippetStore`]. The PostgreSQL
//! backend lives in `snipbin-db`; [`memory::MemorySnippetStore`] backs tests
//! and local development.

pub mod memory;

use async_trait::async_trait;

use crate::snippet::{Snippet, Visibility};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Snippet not found: {0}")]
    NotFound(String),

    #[error("Snippet already exists: {0}")]
    Conflict(String),

    /// A stored record could not be mapped back to a [`Snippet`].
    #[error("Corrupt snippet record: {0}")]
    Corrupt(String),

    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Fields written on first insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnippet {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub visibility: Visibility,
    pub expiry: String,
    pub language: String,
    pub password_hash: Option<String>,
}

/// What an update does to the stored password hash.
///
/// `is_protected` always follows the hash: `Set` protects, `Clear` unprotects.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PasswordChange {
    #[default]
    Keep,
    Set(String),
    Clear,
}

/// Partial update; `None` leaves the stored value unchanged.
///
/// `description` is doubly optional so an update can clear it:
/// `Some(None)` stores no description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub code: Option<String>,
    pub visibility: Option<Visibility>,
    pub expiry: Option<String>,
    pub language: Option<String>,
    pub password: PasswordChange,
}

/// Keyed access to snippet records.
///
/// Implementations must enforce id uniqueness on [`SnippetStore::insert`]
/// atomically, so concurrent first-creates yield exactly one winner and
/// [`StoreError::Conflict`] for the rest.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Look up a snippet by its public id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError>;

    /// Insert a new snippet, failing with [`StoreError::Conflict`] if the id exists.
    async fn insert(&self, snippet: NewSnippet) -> Result<Snippet, StoreError>;

    /// Apply a partial update, failing with [`StoreError::NotFound`] if the id is absent.
    async fn update_by_id(&self, id: &str, changes: SnippetChanges)
        -> Result<Snippet, StoreError>;

    /// Cheap reachability probe used by the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

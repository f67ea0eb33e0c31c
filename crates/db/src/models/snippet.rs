//! Snippet row model.

use snipbin_core::snippet::{Snippet, Visibility};
use snipbin_core::store::StoreError;
use snipbin_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `snippets` table.
///
/// `visibility` is stored as text and checked again when mapped into the
/// domain type.
#[derive(Debug, Clone, FromRow)]
pub struct SnippetRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub visibility: String,
    pub expiry: String,
    pub language: String,
    pub password_hash: Option<String>,
    pub is_protected: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SnippetRow> for Snippet {
    type Error = StoreError;

    fn try_from(row: SnippetRow) -> Result<Self, Self::Error> {
        let visibility: Visibility = row.visibility.parse().map_err(|_| {
            StoreError::Corrupt(format!(
                "snippet {} has unknown visibility '{}'",
                row.id, row.visibility
            ))
        })?;

        Ok(Snippet {
            id: row.id,
            name: row.name,
            description: row.description,
            code: row.code,
            visibility,
            expiry: row.expiry,
            language: row.language,
            password_hash: row.password_hash,
            is_protected: row.is_protected,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

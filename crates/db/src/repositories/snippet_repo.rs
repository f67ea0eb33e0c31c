//! Repository for the `snippets` table.

use snipbin_core::store::{NewSnippet, PasswordChange, SnippetChanges};
use sqlx::PgPool;

use crate::models::snippet::SnippetRow;

/// Column list for `snippets` queries.
const COLUMNS: &str = "\
    id, name, description, code, visibility, expiry, language, \
    password_hash, is_protected, created_at, updated_at";

/// Provides data access for snippets.
pub struct SnippetRepo;

impl SnippetRepo {
    /// Find a snippet by its public id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<SnippetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM snippets WHERE id = $1");
        sqlx::query_as::<_, SnippetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a snippet unless the id is already taken.
    ///
    /// Uses `ON CONFLICT (id) DO NOTHING`, so the uniqueness check and the
    /// write are one statement. Returns `None` when the id already exists.
    pub async fn insert_if_absent(
        pool: &PgPool,
        dto: &NewSnippet,
    ) -> Result<Option<SnippetRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO snippets \
                 (id, name, description, code, visibility, expiry, language, \
                  password_hash, is_protected) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SnippetRow>(&query)
            .bind(&dto.id)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(&dto.code)
            .bind(dto.visibility.as_str())
            .bind(&dto.expiry)
            .bind(&dto.language)
            .bind(&dto.password_hash)
            .bind(dto.password_hash.is_some())
            .fetch_optional(pool)
            .await
    }

    /// Partially update a snippet.
    ///
    /// Uses `COALESCE` so only provided fields are changed. `description`
    /// and the password hash can also be cleared; `is_protected` is set in
    /// the same statement as the hash. Returns `None` if the id is absent.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        dto: &SnippetChanges,
    ) -> Result<Option<SnippetRow>, sqlx::Error> {
        let (password_action, password_hash) = match &dto.password {
            PasswordChange::Keep => ("keep", None),
            PasswordChange::Set(hash) => ("set", Some(hash.as_str())),
            PasswordChange::Clear => ("clear", None),
        };

        let query = format!(
            "UPDATE snippets SET \
                 name = COALESCE($2, name), \
                 description = CASE WHEN $3 THEN $4 ELSE description END, \
                 code = COALESCE($5, code), \
                 visibility = COALESCE($6, visibility), \
                 expiry = COALESCE($7, expiry), \
                 language = COALESCE($8, language), \
                 password_hash = CASE $9 \
                     WHEN 'set' THEN $10 \
                     WHEN 'clear' THEN NULL \
                     ELSE password_hash END, \
                 is_protected = CASE $9 \
                     WHEN 'set' THEN TRUE \
                     WHEN 'clear' THEN FALSE \
                     ELSE is_protected END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SnippetRow>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(dto.description.is_some())
            .bind(dto.description.as_ref().and_then(|d| d.as_deref()))
            .bind(&dto.code)
            .bind(dto.visibility.map(|v| v.as_str()))
            .bind(&dto.expiry)
            .bind(&dto.language)
            .bind(password_action)
            .bind(password_hash)
            .fetch_optional(pool)
            .await
    }
}

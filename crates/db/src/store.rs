//! [`SnippetStore`] backed by PostgreSQL.

use async_trait::async_trait;
use snipbin_core::snippet::Snippet;
use snipbin_core::store::{NewSnippet, SnippetChanges, SnippetStore, StoreError};

use crate::repositories::SnippetRepo;
use crate::DbPool;

/// Snippet store over a connection pool opened once at startup.
#[derive(Debug, Clone)]
pub struct PgSnippetStore {
    pool: DbPool,
}

impl PgSnippetStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Snippet store query failed");
    StoreError::Backend(Box::new(err))
}

#[async_trait]
impl SnippetStore for PgSnippetStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError> {
        SnippetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(backend)?
            .map(Snippet::try_from)
            .transpose()
    }

    async fn insert(&self, snippet: NewSnippet) -> Result<Snippet, StoreError> {
        match SnippetRepo::insert_if_absent(&self.pool, &snippet)
            .await
            .map_err(backend)?
        {
            Some(row) => Snippet::try_from(row),
            None => Err(StoreError::Conflict(snippet.id)),
        }
    }

    async fn update_by_id(
        &self,
        id: &str,
        changes: SnippetChanges,
    ) -> Result<Snippet, StoreError> {
        SnippetRepo::update(&self.pool, id, &changes)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
            .and_then(Snippet::try_from)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(backend)
    }
}

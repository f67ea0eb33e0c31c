//! In-process snippet store backed by a `HashMap` behind a tokio `RwLock`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{NewSnippet, PasswordChange, SnippetChanges, SnippetStore, StoreError};
use crate::snippet::Snippet;

/// Volatile store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySnippetStore {
    snippets: RwLock<HashMap<String, Snippet>>,
}

impl MemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snippets, expired ones included.
    pub async fn len(&self) -> usize {
        self.snippets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snippets.read().await.is_empty()
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError> {
        Ok(self.snippets.read().await.get(id).cloned())
    }

    async fn insert(&self, snippet: NewSnippet) -> Result<Snippet, StoreError> {
        let mut snippets = self.snippets.write().await;

        match snippets.entry(snippet.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(snippet.id)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let is_protected = snippet.password_hash.is_some();
                let stored = Snippet {
                    id: snippet.id,
                    name: snippet.name,
                    description: snippet.description,
                    code: snippet.code,
                    visibility: snippet.visibility,
                    expiry: snippet.expiry,
                    language: snippet.language,
                    password_hash: snippet.password_hash,
                    is_protected,
                    created_at: now,
                    updated_at: now,
                };
                Ok(slot.insert(stored).clone())
            }
        }
    }

    async fn update_by_id(
        &self,
        id: &str,
        changes: SnippetChanges,
    ) -> Result<Snippet, StoreError> {
        let mut snippets = self.snippets.write().await;
        let snippet = snippets
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(name) = changes.name {
            snippet.name = name;
        }
        if let Some(description) = changes.description {
            snippet.description = description;
        }
        if let Some(code) = changes.code {
            snippet.code = code;
        }
        if let Some(visibility) = changes.visibility {
            snippet.visibility = visibility;
        }
        if let Some(expiry) = changes.expiry {
            snippet.expiry = expiry;
        }
        if let Some(language) = changes.language {
            snippet.language = language;
        }
        match changes.password {
            PasswordChange::Keep => {}
            PasswordChange::Set(hash) => {
                snippet.password_hash = Some(hash);
                snippet.is_protected = true;
            }
            PasswordChange::Clear => {
                snippet.password_hash = None;
                snippet.is_protected = false;
            }
        }
        snippet.updated_at = Utc::now();

        Ok(snippet.clone())
    }
}

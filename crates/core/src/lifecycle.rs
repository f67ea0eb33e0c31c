//! Snippet lifecycle: upsert by id, expiry-gated reads, and password gating.
//!
//! A create request for an unknown id inserts; a create request for a known
//! id overwrites the mutable fields in place. The insert is attempted first
//! and a [`StoreError::Conflict`] falls through to the update path, so two
//! racing first-creates for the same id both succeed (one as `Created`, one
//! as `Updated`) instead of surfacing a conflict.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::credentials::{hash_password, verify_password};
use crate::error::CoreError;
use crate::snippet::{
    check_expiry, require_field, today, CreateSnippet, PasswordAttempt, Snippet, SnippetDraft,
};
use crate::store::{NewSnippet, PasswordChange, SnippetChanges, SnippetStore, StoreError};

/// Which branch of the upsert fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Result of a successful password check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// The snippet has no password; nothing was checked.
    Unprotected,
    /// The password matched; the full record is released.
    Unlocked(Snippet),
}

/// Lifecycle operations over a shared [`SnippetStore`].
///
/// Cheaply cloneable; the store handle is constructed once at startup.
#[derive(Clone)]
pub struct SnippetLifecycle {
    store: Arc<dyn SnippetStore>,
}

impl SnippetLifecycle {
    pub fn new(store: Arc<dyn SnippetStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SnippetStore> {
        &self.store
    }

    /// Create the snippet, or overwrite it if the id already exists.
    ///
    /// The stored password hash is replaced only when the request carries a
    /// new non-empty password; otherwise the prior protection state is kept.
    pub async fn upsert(
        &self,
        request: CreateSnippet,
    ) -> Result<(UpsertOutcome, Snippet), CoreError> {
        let draft = request.into_draft()?;

        let password_hash = draft
            .password
            .as_deref()
            .map(hash_password)
            .transpose()
            .map_err(|e| CoreError::Internal(e.to_string()))?;

        match self.store.insert(new_snippet(&draft, password_hash.clone())).await {
            Ok(snippet) => {
                tracing::info!(
                    snippet_id = %snippet.id,
                    language = %snippet.language,
                    is_protected = snippet.is_protected,
                    "Snippet created",
                );
                return Ok((UpsertOutcome::Created, snippet));
            }
            Err(StoreError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let password = match password_hash {
            Some(hash) => PasswordChange::Set(hash),
            None => PasswordChange::Keep,
        };
        let changes = SnippetChanges {
            name: Some(draft.name),
            description: Some(draft.description),
            code: Some(draft.code),
            visibility: Some(draft.visibility),
            expiry: Some(draft.expiry),
            language: Some(draft.language),
            password,
        };

        let snippet = self.store.update_by_id(&draft.id, changes).await?;
        tracing::info!(
            snippet_id = %snippet.id,
            is_protected = snippet.is_protected,
            "Snippet updated",
        );

        Ok((UpsertOutcome::Updated, snippet))
    }

    /// Fetch a snippet, refusing expired ones.
    ///
    /// Protection does not gate this read; the caller decides whether to
    /// display a protected snippet before [`Self::verify_password`] succeeds.
    pub async fn fetch(&self, id: &str) -> Result<Snippet, CoreError> {
        self.fetch_as_of(id, today()).await
    }

    /// [`Self::fetch`] evaluated against an explicit current date.
    pub async fn fetch_as_of(&self, id: &str, today: NaiveDate) -> Result<Snippet, CoreError> {
        let id = require_field(Some(id.trim().to_string()), "id")?;
        let snippet = self.find_existing(&id).await?;
        check_expiry(&snippet, today)?;
        Ok(snippet)
    }

    /// Check a password against a snippet.
    ///
    /// An unprotected snippet verifies vacuously without releasing its data.
    /// The stored expiry is not consulted here; only reads are gated by it.
    pub async fn verify_password(
        &self,
        attempt: PasswordAttempt,
    ) -> Result<Verification, CoreError> {
        let (snippet, checked) = self.authenticate(attempt, None).await?;
        if checked {
            Ok(Verification::Unlocked(snippet))
        } else {
            Ok(Verification::Unprotected)
        }
    }

    /// Remove password protection after confirming the current password.
    ///
    /// Clearing an unprotected snippet is a no-op that returns the record.
    /// Expired snippets are refused before the password is compared.
    pub async fn clear_password(&self, attempt: PasswordAttempt) -> Result<Snippet, CoreError> {
        let (snippet, checked) = self.authenticate(attempt, Some(today())).await?;
        if !checked {
            return Ok(snippet);
        }

        let changes = SnippetChanges {
            password: PasswordChange::Clear,
            ..Default::default()
        };
        let snippet = self.store.update_by_id(&snippet.id, changes).await?;
        tracing::info!(snippet_id = %snippet.id, "Snippet password cleared");

        Ok(snippet)
    }

    /// Resolve the snippet and check the password against its hash.
    ///
    /// When `expiry_as_of` is set, the expiry gate runs before the comparison.
    /// Returns the snippet and whether a password was actually compared.
    async fn authenticate(
        &self,
        attempt: PasswordAttempt,
        expiry_as_of: Option<NaiveDate>,
    ) -> Result<(Snippet, bool), CoreError> {
        let id = require_field(attempt.id, "id")?;
        let password = attempt
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CoreError::Validation("Field 'password' is required".into()))?;

        let snippet = self.find_existing(&id).await?;
        if let Some(today) = expiry_as_of {
            check_expiry(&snippet, today)?;
        }

        let hash = match snippet.password_hash.as_deref() {
            Some(hash) if !hash.is_empty() => hash,
            _ => return Ok((snippet, false)),
        };

        if !verify_password(&password, hash) {
            tracing::warn!(snippet_id = %id, "Incorrect snippet password");
            return Err(CoreError::Unauthorized("Incorrect password".into()));
        }

        Ok((snippet, true))
    }

    async fn find_existing(&self, id: &str) -> Result<Snippet, CoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Snippet",
                id: id.to_string(),
            })
    }
}

fn new_snippet(draft: &SnippetDraft, password_hash: Option<String>) -> NewSnippet {
    NewSnippet {
        id: draft.id.clone(),
        name: draft.name.clone(),
        description: draft.description.clone(),
        code: draft.code.clone(),
        visibility: draft.visibility,
        expiry: draft.expiry.clone(),
        language: draft.language.clone(),
        password_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::Visibility;
    use crate::store::memory::MemorySnippetStore;
    use assert_matches::assert_matches;
    use chrono::{Days, Utc};

    fn lifecycle() -> (SnippetLifecycle, Arc<MemorySnippetStore>) {
        let store = Arc::new(MemorySnippetStore::new());
        (SnippetLifecycle::new(store.clone()), store)
    }

    fn request(id: &str, code: &str) -> CreateSnippet {
        CreateSnippet {
            id: Some(id.into()),
            language: Some("python".into()),
            name: Some("t".into()),
            code: Some(code.into()),
            expiry: Some("2099-01-01".into()),
            ..Default::default()
        }
    }

    fn protected(id: &str, password: &str) -> CreateSnippet {
        CreateSnippet {
            password: Some(password.into()),
            ..request(id, "secret code")
        }
    }

    fn attempt(id: &str, password: &str) -> PasswordAttempt {
        PasswordAttempt {
            id: Some(id.into()),
            password: Some(password.into()),
        }
    }

    fn days_from_today(offset: i64) -> String {
        let today = Utc::now().date_naive();
        let date = if offset >= 0 {
            today.checked_add_days(Days::new(offset as u64))
        } else {
            today.checked_sub_days(Days::new(offset.unsigned_abs()))
        };
        date.unwrap().format("%Y-%m-%d").to_string()
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips_fields() {
        let (lifecycle, _) = lifecycle();
        let req = CreateSnippet {
            visibility: Some(Visibility::Private),
            ..request("abc123", "print(1)")
        };

        let (outcome, created) = lifecycle.upsert(req).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let fetched = lifecycle.fetch("abc123").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "t");
        assert_eq!(fetched.code, "print(1)");
        assert_eq!(fetched.language, "python");
        assert_eq!(fetched.visibility, Visibility::Private);
        assert_eq!(fetched.expiry, "2099-01-01");
        assert!(!fetched.is_protected);
    }

    #[tokio::test]
    async fn second_create_updates_in_place() {
        let (lifecycle, store) = lifecycle();

        let (first, _) = lifecycle.upsert(request("abc123", "print(1)")).await.unwrap();
        let (second, _) = lifecycle.upsert(request("abc123", "print(2)")).await.unwrap();

        assert_eq!(first, UpsertOutcome::Created);
        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(store.len().await, 1);
        assert_eq!(lifecycle.fetch("abc123").await.unwrap().code, "print(2)");
    }

    #[tokio::test]
    async fn update_overwrites_description_and_visibility() {
        let (lifecycle, _) = lifecycle();
        let first = CreateSnippet {
            description: Some("first".into()),
            visibility: Some(Visibility::Private),
            ..request("s1", "a")
        };
        lifecycle.upsert(first).await.unwrap();

        let (_, updated) = lifecycle.upsert(request("s1", "b")).await.unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.visibility, Visibility::Public);
    }

    #[tokio::test]
    async fn missing_required_field_touches_no_storage() {
        let (lifecycle, store) = lifecycle();
        let req = CreateSnippet {
            code: None,
            ..request("abc123", "")
        };

        assert_matches!(lifecycle.upsert(req).await, Err(CoreError::Validation(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn password_is_hashed_and_verifies() {
        let (lifecycle, _) = lifecycle();
        let (_, created) = lifecycle.upsert(protected("p1", "hunter2")).await.unwrap();

        assert!(created.is_protected);
        let hash = created.password_hash.as_deref().unwrap();
        assert_ne!(hash, "hunter2");

        let verified = lifecycle.verify_password(attempt("p1", "hunter2")).await.unwrap();
        assert_matches!(verified, Verification::Unlocked(s) if s.code == "secret code");

        assert_matches!(
            lifecycle.verify_password(attempt("p1", "wrong")).await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn update_without_password_keeps_protection() {
        let (lifecycle, _) = lifecycle();
        let (_, created) = lifecycle.upsert(protected("p1", "hunter2")).await.unwrap();

        let (_, updated) = lifecycle.upsert(request("p1", "new code")).await.unwrap();
        assert!(updated.is_protected);
        assert_eq!(updated.password_hash, created.password_hash);
        assert!(lifecycle.verify_password(attempt("p1", "hunter2")).await.is_ok());
    }

    #[tokio::test]
    async fn update_with_password_rehashes() {
        let (lifecycle, _) = lifecycle();
        lifecycle.upsert(protected("p1", "old-pass")).await.unwrap();
        lifecycle.upsert(protected("p1", "new-pass")).await.unwrap();

        assert_matches!(
            lifecycle.verify_password(attempt("p1", "old-pass")).await,
            Err(CoreError::Unauthorized(_))
        );
        assert!(lifecycle.verify_password(attempt("p1", "new-pass")).await.is_ok());
    }

    #[tokio::test]
    async fn update_can_protect_an_unprotected_snippet() {
        let (lifecycle, _) = lifecycle();
        lifecycle.upsert(request("p1", "a")).await.unwrap();

        let (_, updated) = lifecycle.upsert(protected("p1", "late")).await.unwrap();
        assert!(updated.is_protected);
    }

    #[tokio::test]
    async fn verify_unprotected_is_vacuous() {
        let (lifecycle, _) = lifecycle();
        lifecycle.upsert(request("open", "a")).await.unwrap();

        let verified = lifecycle.verify_password(attempt("open", "anything")).await.unwrap();
        assert_eq!(verified, Verification::Unprotected);
    }

    #[tokio::test]
    async fn verify_requires_id_and_password() {
        let (lifecycle, _) = lifecycle();

        let no_password = PasswordAttempt {
            id: Some("p1".into()),
            password: None,
        };
        assert_matches!(
            lifecycle.verify_password(no_password).await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            lifecycle.verify_password(attempt("", "x")).await,
            Err(CoreError::Validation(_))
        );
    }

    #[tokio::test]
    async fn verify_missing_snippet_is_not_found() {
        let (lifecycle, _) = lifecycle();
        assert_matches!(
            lifecycle.verify_password(attempt("ghost", "x")).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn fetch_unknown_id_is_not_found() {
        let (lifecycle, _) = lifecycle();
        assert_matches!(
            lifecycle.fetch("never-created").await,
            Err(CoreError::NotFound { id, .. }) if id == "never-created"
        );
    }

    #[tokio::test]
    async fn fetch_respects_expiry() {
        let (lifecycle, _) = lifecycle();
        let yesterday = CreateSnippet {
            expiry: Some(days_from_today(-1)),
            ..request("old", "a")
        };
        let tomorrow = CreateSnippet {
            expiry: Some(days_from_today(1)),
            ..request("fresh", "a")
        };
        lifecycle.upsert(yesterday).await.unwrap();
        lifecycle.upsert(tomorrow).await.unwrap();

        assert_matches!(lifecycle.fetch("old").await, Err(CoreError::Expired { .. }));
        assert!(lifecycle.fetch("fresh").await.is_ok());
    }

    #[tokio::test]
    async fn verify_ignores_expiry() {
        let (lifecycle, store) = lifecycle();
        let expired = CreateSnippet {
            expiry: Some("2020-01-01".into()),
            ..protected("p1", "hunter2")
        };
        lifecycle.upsert(expired).await.unwrap();

        let verified = lifecycle.verify_password(attempt("p1", "hunter2")).await.unwrap();
        assert_matches!(verified, Verification::Unlocked(s) if s.expiry == "2020-01-01");
        assert_matches!(
            lifecycle.verify_password(attempt("p1", "wrong")).await,
            Err(CoreError::Unauthorized(_))
        );

        lifecycle.upsert(request("open", "a")).await.unwrap();
        let changes = SnippetChanges {
            expiry: Some("garbage".into()),
            ..Default::default()
        };
        store.update_by_id("open", changes).await.unwrap();

        let verified = lifecycle.verify_password(attempt("open", "x")).await.unwrap();
        assert_eq!(verified, Verification::Unprotected);
    }

    #[tokio::test]
    async fn clear_password_checks_expiry_before_password() {
        let (lifecycle, _) = lifecycle();
        let expired = CreateSnippet {
            expiry: Some("2020-01-01".into()),
            ..protected("p1", "hunter2")
        };
        lifecycle.upsert(expired).await.unwrap();

        assert_matches!(
            lifecycle.clear_password(attempt("p1", "wrong")).await,
            Err(CoreError::Expired { .. })
        );
    }

    #[tokio::test]
    async fn corrupt_stored_expiry_is_invalid_state() {
        let (lifecycle, store) = lifecycle();
        lifecycle.upsert(request("bad", "a")).await.unwrap();

        let changes = SnippetChanges {
            expiry: Some("not a date".into()),
            ..Default::default()
        };
        store.update_by_id("bad", changes).await.unwrap();

        assert_matches!(lifecycle.fetch("bad").await, Err(CoreError::InvalidState(_)));
    }

    #[tokio::test]
    async fn fetch_trims_surrounding_whitespace_from_id() {
        let (lifecycle, _) = lifecycle();
        lifecycle.upsert(request("abc123", "a")).await.unwrap();

        assert_eq!(lifecycle.fetch(" abc123 ").await.unwrap().id, "abc123");
        assert_matches!(lifecycle.fetch("   ").await, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn fetch_as_of_uses_given_date() {
        let (lifecycle, _) = lifecycle();
        lifecycle.upsert(request("abc123", "a")).await.unwrap();

        let before = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2099, 1, 2).unwrap();
        assert!(lifecycle.fetch_as_of("abc123", before).await.is_ok());
        assert_matches!(
            lifecycle.fetch_as_of("abc123", after).await,
            Err(CoreError::Expired { .. })
        );
    }

    #[tokio::test]
    async fn clear_password_unprotects() {
        let (lifecycle, _) = lifecycle();
        lifecycle.upsert(protected("p1", "hunter2")).await.unwrap();

        assert_matches!(
            lifecycle.clear_password(attempt("p1", "wrong")).await,
            Err(CoreError::Unauthorized(_))
        );

        let cleared = lifecycle.clear_password(attempt("p1", "hunter2")).await.unwrap();
        assert!(!cleared.is_protected);
        assert_eq!(cleared.password_hash, None);

        let verified = lifecycle.verify_password(attempt("p1", "whatever")).await.unwrap();
        assert_eq!(verified, Verification::Unprotected);
    }

    #[tokio::test]
    async fn concurrent_first_creates_collapse_to_one_record() {
        let (lifecycle, store) = lifecycle();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let lifecycle = lifecycle.clone();
                tokio::spawn(async move {
                    lifecycle
                        .upsert(request("race", &format!("v{i}")))
                        .await
                        .map(|(outcome, _)| outcome)
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == UpsertOutcome::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }
}

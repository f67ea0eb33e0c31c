//! The `Snippet` entity, its request DTOs, and the pure rules applied to them.
//!
//! Nothing here touches storage: required-field checks, visibility parsing,
//! and expiry evaluation are plain functions so the lifecycle service and the
//! storage backends share one definition of each rule.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{SnippetId, Timestamp};

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Who may see a snippet in listings. Defaults to public.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl FromStr for Visibility {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(CoreError::Validation(format!(
                "Invalid visibility '{other}'. Must be one of: public, private"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A stored snippet.
///
/// `password_hash` is never serialized; clients only see `is_protected`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: SnippetId,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub visibility: Visibility,
    pub expiry: String,
    pub language: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_protected: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Create-or-update request body.
///
/// Every field is optional at the serde level so that a missing field is
/// reported as a validation error rather than a deserialization failure.
/// Aliases accept the field names used by the legacy web client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSnippet {
    #[serde(default, alias = "uuid")]
    pub id: Option<String>,
    #[serde(default, alias = "lang")]
    pub language: Option<String>,
    #[serde(default, alias = "pass")]
    pub password: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
}

/// Body of the verify-password and clear-password requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordAttempt {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetDraft {
    pub id: SnippetId,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub visibility: Visibility,
    pub expiry: String,
    pub language: String,
    /// Plaintext password, present only when the client supplied a non-empty one.
    pub password: Option<String>,
}

impl CreateSnippet {
    /// Check required fields and the expiry format, producing a [`SnippetDraft`].
    pub fn into_draft(self) -> Result<SnippetDraft, CoreError> {
        let id = require_field(self.id, "id")?;
        let language = require_field(self.language, "language")?;
        let name = require_field(self.name, "name")?;
        let code = require_field(self.code, "code")?;
        let expiry = require_field(self.expiry, "expiry")?;

        if parse_expiry(&expiry).is_none() {
            return Err(CoreError::Validation(format!(
                "Invalid expiry date '{expiry}'. Expected YYYY-MM-DD"
            )));
        }

        Ok(SnippetDraft {
            id,
            name,
            description: self.description,
            code,
            visibility: self.visibility.unwrap_or_default(),
            expiry,
            language,
            password: self.password.filter(|p| !p.is_empty()),
        })
    }
}

/// Ensure an optional request field is present and not blank.
pub fn require_field(value: Option<String>, field: &str) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("Field '{field}' is required"))),
    }
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// Parse a stored expiry into a calendar date.
///
/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp (its UTC date), or a naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` timestamp (its date).
pub fn parse_expiry(expiry: &str) -> Option<NaiveDate> {
    let expiry = expiry.trim();

    if let Ok(date) = NaiveDate::parse_from_str(expiry, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(expiry) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(expiry, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

/// Current date in UTC, with no time component.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Reject reads of a snippet whose expiry date lies strictly before `today`.
///
/// A snippet expiring today is still readable. An expiry that cannot be
/// parsed is reported as [`CoreError::InvalidState`].
pub fn check_expiry(snippet: &Snippet, today: NaiveDate) -> Result<(), CoreError> {
    let expiry = parse_expiry(&snippet.expiry).ok_or_else(|| {
        CoreError::InvalidState(format!(
            "Invalid expiry date format '{}' on snippet {}",
            snippet.expiry, snippet.id
        ))
    })?;

    if today > expiry {
        return Err(CoreError::Expired {
            id: snippet.id.clone(),
            expiry: snippet.expiry.clone(),
        });
    }
    Ok(())
}

//! Response envelopes for API handlers.
//!
//! Every successful response carries a top-level `success: true` flag next
//! to its payload; errors use the `{ success: false, error, code }` shape
//! produced by [`AppError`](crate::error::AppError).

use serde::Serialize;
use snipbin_core::lifecycle::UpsertOutcome;
use snipbin_core::snippet::Snippet;

/// `{ "success": true, "snippet": ... }`
#[derive(Debug, Serialize)]
pub struct SnippetResponse {
    pub success: bool,
    pub snippet: Snippet,
}

impl SnippetResponse {
    pub fn new(snippet: Snippet) -> Self {
        Self {
            success: true,
            snippet,
        }
    }
}

/// `{ "success": true, "outcome": "created" | "updated", "snippet": ... }`
#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub success: bool,
    pub outcome: UpsertOutcome,
    pub snippet: Snippet,
}

/// `{ "success": true }`, plus the snippet when a password unlocked it.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<Snippet>,
}

//! Handlers for snippet create, fetch, and password operations.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use axum::Json;
use snipbin_core::lifecycle::Verification;
use snipbin_core::snippet::{CreateSnippet, PasswordAttempt};

use crate::error::AppResult;
use crate::extract::SnippetIdHeader;
use crate::response::{SnippetResponse, UpsertResponse, VerifyResponse};
use crate::state::AppState;

/// POST /api/create
///
/// Create a snippet, or update it in place when the id already exists.
/// Responds 200 in both cases; `outcome` tells the branches apart.
pub async fn create_snippet(
    State(state): State<AppState>,
    payload: Result<Json<CreateSnippet>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let (outcome, snippet) = state.lifecycle.upsert(input).await?;

    Ok(Json(UpsertResponse {
        success: true,
        outcome,
        snippet,
    }))
}

/// GET /api/snipp
///
/// Fetch a snippet by the id in the `id` header. Responses are never cached.
pub async fn get_snippet(
    State(state): State<AppState>,
    SnippetIdHeader(id): SnippetIdHeader,
) -> AppResult<impl IntoResponse> {
    fetch(&state, &id).await
}

/// GET /api/snippets/{id}
pub async fn get_snippet_by_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    fetch(&state, &id).await
}

async fn fetch(state: &AppState, id: &str) -> AppResult<impl IntoResponse> {
    let snippet = state.lifecycle.fetch(id).await?;

    tracing::debug!(snippet_id = %snippet.id, is_protected = snippet.is_protected, "Snippet fetched");

    Ok((
        [(CACHE_CONTROL, "no-store")],
        Json(SnippetResponse::new(snippet)),
    ))
}

/// POST /api/verify-password
///
/// Check a snippet password. Unprotected snippets verify without a payload;
/// a matching password releases the full snippet.
pub async fn verify_password(
    State(state): State<AppState>,
    payload: Result<Json<PasswordAttempt>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(attempt) = payload?;

    let snippet = match state.lifecycle.verify_password(attempt).await? {
        Verification::Unprotected => None,
        Verification::Unlocked(snippet) => Some(snippet),
    };

    Ok(Json(VerifyResponse {
        success: true,
        snippet,
    }))
}

/// POST /api/clear-password
///
/// Remove password protection after confirming the current password.
pub async fn clear_password(
    State(state): State<AppState>,
    payload: Result<Json<PasswordAttempt>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(attempt) = payload?;
    let snippet = state.lifecycle.clear_password(attempt).await?;

    Ok(Json(SnippetResponse::new(snippet)))
}

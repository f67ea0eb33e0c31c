//! Route definitions for snippets.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::snippets;
use crate::state::AppState;

/// Snippet routes mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(snippets::create_snippet))
        .route("/snipp", get(snippets::get_snippet))
        .route("/snippets/{id}", get(snippets::get_snippet_by_path))
        .route("/verify-password", post(snippets::verify_password))
        .route("/clear-password", post(snippets::clear_password))
}

pub mod health;
pub mod snippets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// POST /create                    create or update (upsert by id)
/// GET  /snipp                     fetch, id in the `id` header
/// GET  /snippets/{id}             fetch, id in the path
/// POST /verify-password           check a snippet password
/// POST /clear-password            remove password protection
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(snippets::router())
}

use snipbin_core::lifecycle::SnippetLifecycle;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the lifecycle holds its store behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Snippet lifecycle service over the configured store.
    pub lifecycle: SnippetLifecycle,
}

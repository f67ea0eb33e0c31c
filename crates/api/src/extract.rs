//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Name of the request header carrying the snippet id on `GET /api/snipp`.
pub const SNIPPET_ID_HEADER: &str = "id";

/// Snippet id taken from the `id` request header.
///
/// Rejects with 400 when the header is missing, blank, or not valid UTF-8.
#[derive(Debug, Clone)]
pub struct SnippetIdHeader(pub String);

impl<S> FromRequestParts<S> for SnippetIdHeader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(SNIPPET_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| SnippetIdHeader(v.to_string()))
            .ok_or_else(|| AppError::BadRequest("No id mentioned".into()))
    }
}

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod snippet_repo;

pub use snippet_repo::SnippetRepo;

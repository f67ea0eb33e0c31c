//! Domain core of the snippet sharing service.
//!
//! - [`credentials`] -- Argon2id hashing and verification for snippet passwords.
//! - [`snippet`] -- the `Snippet` entity, request DTOs, validation, and expiry evaluation.
//! - [`store`] -- the storage trait and the in-memory backend.
//! - [`lifecycle`] -- upsert, fetch, and password gating over a store.

pub mod credentials;
pub mod error;
pub mod lifecycle;
pub mod snippet;
pub mod store;
pub mod types;

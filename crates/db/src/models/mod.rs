//! Row structs for the snippet tables.

pub mod snippet;

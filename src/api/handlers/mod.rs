//! API request handlers.

/// Direct model queries.
pub mod ai;
/// Development probes (mounted only in the dev stage).
pub mod dev;
/// Health check.
pub mod health;
/// PDF upload and retrieval-augmented answers.
pub mod pdf;

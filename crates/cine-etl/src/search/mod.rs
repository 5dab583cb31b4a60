//! Search engine access
//!
//! A thin HTTP client over the search engine's REST surface: idempotent
//! index creation and bulk upserts-by-id. The fixed per-kind index
//! definitions (analyzer settings + strict mappings) live in [`indices`].

pub mod client;
pub mod indices;

pub use client::{BulkOutcome, FailedDocument, SearchClient, WriteAction};

//! Cinesearch ETL service
//!
//! Keeps the full-text search indexes in sync with the relational film
//! catalog. Each entity kind (film works, genres, persons) has its own
//! pipeline that picks up rows modified since the last successful run,
//! denormalizes them with server-side aggregation, reshapes them into search
//! documents and bulk-upserts them, recording progress in the state backend
//! so a crash never loses an update.
//!
//! # Architecture
//!
//! - **config**: environment-driven service configuration
//! - **error**: the `EtlError` taxonomy shared by every component
//! - **state**: durable sync progress (watermark + in-flight document ids)
//!   behind a pluggable storage trait, Redis in production
//! - **search**: thin HTTP client for the search engine (index creation,
//!   bulk upserts) plus the fixed per-kind index definitions
//! - **etl**: the pipeline core: per-kind extraction SQL and row types,
//!   the generic extract/transform/load stages and the scheduler that runs
//!   one pipeline task per entity kind on a fixed interval

pub mod config;
pub mod error;
pub mod etl;
pub mod search;
pub mod state;

pub use config::EtlConfig;
pub use error::{EtlError, Result};
pub use etl::Scheduler;

//! The sync pipeline core
//!
//! One pipeline per entity kind, all built from the same generic stages:
//!
//! - **kind**: the [`EntityKind`] trait: per-kind SQL, index name and
//!   definition, state key prefix, row type
//! - **filmwork** / **genre** / **person**: the three entity kinds with
//!   their denormalized row types and extraction queries
//! - **extract**: change detection against the watermark plus streaming,
//!   batched row fetches
//! - **transform**: pure row-to-document reshaping
//! - **load**: index bootstrap, bulk upsert, progress recording
//! - **pipeline**: extract → transform → load per batch, then finalize
//! - **scheduler**: one task per kind per cycle, repeating on a fixed
//!   interval

pub mod extract;
pub mod filmwork;
pub mod genre;
pub mod kind;
pub mod load;
pub mod person;
pub mod pipeline;
pub mod scheduler;
pub mod transform;

pub use extract::Extractor;
pub use filmwork::Filmwork;
pub use genre::Genre;
pub use kind::EntityKind;
pub use load::Loader;
pub use person::Person;
pub use pipeline::Pipeline;
pub use scheduler::Scheduler;
pub use transform::transform;

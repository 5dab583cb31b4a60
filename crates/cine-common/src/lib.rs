//! Shared plumbing for Cinesearch services
//!
//! Currently this crate carries the logging setup used by every binary in
//! the workspace. Service-specific concerns (configuration, errors, domain
//! types) live with the services themselves.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};

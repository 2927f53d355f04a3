//! Observability for the catalog feed.
//!
//! The library crates only emit `tracing` events. Binaries call
//! [`init_logging`] once at startup to install a subscriber that writes
//! them as JSON (for log aggregation) or as compact human-readable lines.

mod logging;

pub use logging::*;

//! Paged product fetch coordination.
//!
//! The [`FetchCoordinator`] owns the page cursor and the accumulated product
//! list for one search term at a time. Each fetch carries a request token;
//! a response whose token no longer matches (because the term was reset in
//! the meantime) is discarded instead of applied.

mod coordinator;
mod cursor;
mod error;
pub mod extract;

pub use coordinator::{FetchCoordinator, FetchOutcome, FetchSnapshot, FetchStats, SkipReason};
pub use cursor::PageCursor;
pub use error::FetchError;

//! Remote product search boundary.
//!
//! This crate provides:
//! - `SearchProvider` - the one operation the feed needs: search by keyword and page
//! - `HttpSearchProvider` - the provider over HTTP, with default headers and timeouts
//! - `InMemoryProvider` - a paged in-memory catalog for tests and offline demos
//! - `shape` - JSON pointers into the provider's nested response

mod client;
mod error;
mod memory;
mod provider;
pub mod shape;
mod timeout;

pub use client::*;
pub use error::*;
pub use memory::*;
pub use provider::*;
pub use timeout::*;

//! Bounded image cache with batched concurrent preloading.
//!
//! This crate provides:
//! - `ImageCache` - URL -> decoded image store with a fixed capacity
//! - `ImageLoader` / `HttpImageLoader` - download and decode an image
//! - `PlaceholderLoader` - blank images for offline runs and tests
//! - `ImagePreloader` - warms the cache for a freshly fetched product list

mod cache;
mod error;
mod loader;
mod preloader;

pub use cache::*;
pub use error::*;
pub use loader::*;
pub use preloader::*;

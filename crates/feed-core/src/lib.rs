//! Catalog feed composition.
//!
//! This crate ties the feed components together:
//! - `CatalogSession` - owns one coordinator, cart, reveal scheduler and preloader
//! - `FeedConfig` - the configuration file, loaded from TOML or JSON
//! - `SearchDebouncer` - turns raw search input into settled terms
//! - `ScrollTrigger` - decides when scrolling should load the next page
//! - `FeedMetrics` - a serializable snapshot of a session
//!
//! # Example
//!
//! ```ignore
//! use feed_core::prelude::*;
//!
//! let config = FeedConfig::default();
//! let images = config.images.build_cache(Arc::new(PlaceholderLoader::default()));
//! let mut session = CatalogSession::new(InMemoryProvider::demo("shoes", 45, 20), images, &config);
//!
//! session.apply_search("shoes").await?;
//! for product in session.visible_products() {
//!     println!("{} {}", product.name, product.price_display());
//! }
//! ```

mod config;
mod debounce;
mod error;
mod metrics;
mod scroll;
mod session;

pub use config::*;
pub use debounce::SearchDebouncer;
pub use error::{ConfigError, FeedError};
pub use metrics::FeedMetrics;
pub use scroll::{ScrollPosition, ScrollTrigger};
pub use session::CatalogSession;

/// Prelude for convenient imports.
pub mod prelude {
    pub use std::sync::Arc;

    pub use feed_cart::{CartManager, Notification, Severity};
    pub use feed_data::{HttpSearchProvider, InMemoryProvider, SearchProvider};
    pub use feed_fetch::{FetchError, FetchOutcome, PageCursor};
    pub use feed_image::{HttpImageLoader, ImageCache, ImageLoader, PlaceholderLoader};
    pub use feed_model::{CartItem, Product, ProductId};
    pub use feed_reveal::{RevealConfig, RevealWindow};

    pub use crate::{
        CatalogSession, FeedConfig, FeedError, FeedMetrics, ScrollPosition, ScrollTrigger,
        SearchDebouncer,
    };
}

//! Catalog session: the composition root of the feed.

use std::sync::Arc;
use std::time::Duration;

use feed_cart::{CartManager, Notification};
use feed_data::SearchProvider;
use feed_fetch::{FetchCoordinator, FetchError, FetchOutcome, PageCursor};
use feed_image::{ImageCache, ImagePreloader};
use feed_model::{Product, ProductId, SessionId};
use feed_reveal::{RevealScheduler, RevealWindow};
use tokio::sync::watch;

use crate::{FeedConfig, FeedError, FeedMetrics, ScrollPosition, ScrollTrigger};

/// One user's browsing session.
///
/// Data flows one way: the search term drives the coordinator, the fetched
/// list minus the cart feeds the reveal window, and the available list warms
/// the image cache. Every mutation refreshes that chain.
///
/// Methods that change the available list spawn reveal and preload tasks and
/// must run inside a Tokio runtime.
pub struct CatalogSession<P> {
    id: SessionId,
    coordinator: FetchCoordinator<P>,
    cart: CartManager,
    reveal: RevealScheduler,
    images: Arc<ImageCache>,
    preloader: ImagePreloader,
    scroll: ScrollTrigger,
    cleanup_max_age: Duration,
}

impl<P: SearchProvider> CatalogSession<P> {
    /// Create a session over `provider`, sharing the `images` cache.
    pub fn new(provider: P, images: Arc<ImageCache>, config: &FeedConfig) -> Self {
        Self {
            id: SessionId::generate(),
            coordinator: FetchCoordinator::new(provider),
            cart: CartManager::new(),
            reveal: RevealScheduler::new(config.reveal),
            preloader: ImagePreloader::new(Arc::clone(&images), config.images.preload()),
            images,
            scroll: ScrollTrigger::new(config.scroll.threshold_px),
            cleanup_max_age: config.images.cleanup_max_age,
        }
    }

    /// Switch to `term` and fetch its first page.
    ///
    /// Clears the image cache and restarts image warm-up for the new list.
    pub async fn apply_search(&mut self, term: &str) -> Result<FetchOutcome, FeedError> {
        let term = term.trim();
        tracing::info!(session = %self.id, term, "applying search");

        self.coordinator.reset(term);
        self.images.cleanup(Duration::ZERO);
        self.preloader.reset();
        self.refresh();

        let outcome = self.coordinator.fetch_next().await;
        self.refresh();
        Ok(outcome?)
    }

    /// Fetch the next page for the current term.
    pub async fn load_more(&mut self) -> Result<FetchOutcome, FeedError> {
        let before = self.coordinator.product_count();
        let outcome = self.coordinator.fetch_next().await;
        self.refresh();

        if before > 0 && matches!(outcome, Ok(FetchOutcome::Appended { .. })) {
            let preloader = &mut self.preloader;
            let batch = self.coordinator.with_products(|products| {
                preloader.preload_next_batch(products.iter().map(|p| p.image.as_deref()), before)
            });
            drop(batch);
        }
        Ok(outcome?)
    }

    /// Check if scrolling to `position` should load the next page.
    pub fn should_load_more(&self, position: &ScrollPosition) -> bool {
        self.scroll.should_fetch(position, &self.coordinator.cursor())
    }

    /// Add `product` to the cart.
    pub fn add_to_cart(&mut self, product: Product) -> Result<(), FeedError> {
        self.cart.add_to_cart(product)?;
        self.refresh();
        Ok(())
    }

    /// Add a product from a serialized drop payload.
    pub fn add_from_json(&mut self, payload: &str) -> Result<(), FeedError> {
        self.cart.add_from_json(payload)?;
        self.refresh();
        Ok(())
    }

    /// Add the fetched product with `id`. Returns `false` if it was not fetched.
    pub fn add_by_id(&mut self, id: &ProductId) -> Result<bool, FeedError> {
        let product = self
            .coordinator
            .with_products(|products| products.iter().find(|p| &p.id == id).cloned());
        match product {
            Some(product) => self.add_to_cart(product).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) {
        self.cart.remove_from_cart(id);
        self.refresh();
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear_cart();
        self.refresh();
    }

    pub fn close_notification(&mut self) {
        self.cart.close_notification();
    }

    fn refresh(&mut self) {
        let available = self.available_products();
        self.reveal.set_total(available.len());
        drop(self.preloader.warm(available.iter().map(|p| p.image.as_deref())));
    }
}

impl<P> CatalogSession<P> {
    /// Fetched products not in the cart, in fetch order.
    pub fn available_products(&self) -> Vec<Product> {
        self.coordinator.with_products(|products| {
            self.cart
                .available(products)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// The revealed prefix of the available products.
    pub fn visible_products(&self) -> Vec<Product> {
        let mut available = self.available_products();
        available.truncate(self.reveal.revealed());
        available
    }

    /// Drop images idle longer than the configured maximum age.
    pub fn cleanup_images(&self) -> usize {
        self.images.cleanup(self.cleanup_max_age)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn term(&self) -> String {
        self.coordinator.term()
    }

    pub fn cursor(&self) -> PageCursor {
        self.coordinator.cursor()
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.is_fetching()
    }

    pub fn has_more(&self) -> bool {
        self.coordinator.has_more()
    }

    /// The error that stopped pagination for the current term.
    pub fn error(&self) -> Option<FetchError> {
        self.coordinator.error()
    }

    pub fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub fn notification(&self) -> &Notification {
        self.cart.notification()
    }

    pub fn reveal_window(&self) -> RevealWindow {
        self.reveal.window()
    }

    /// Receive every change of the reveal window.
    pub fn subscribe_reveal(&self) -> watch::Receiver<RevealWindow> {
        self.reveal.subscribe()
    }

    pub fn coordinator(&self) -> &FetchCoordinator<P> {
        &self.coordinator
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    /// Snapshot of the session's counters.
    pub fn metrics(&self) -> FeedMetrics {
        let cursor = self.coordinator.cursor();
        FeedMetrics {
            session_id: self.id.clone(),
            captured_at: chrono::Utc::now(),
            term: self.coordinator.term(),
            page: cursor.page,
            has_more: cursor.has_more,
            error: self.coordinator.error().map(|e| e.to_string()),
            fetch: self.coordinator.stats(),
            products_accumulated: self.coordinator.product_count(),
            available: self.available_products().len(),
            revealed: self.reveal.revealed(),
            cart_items: self.cart.len(),
            cache_entries: self.images.len(),
            cache_capacity: self.images.capacity(),
            cache: self.images.stats(),
        }
    }
}

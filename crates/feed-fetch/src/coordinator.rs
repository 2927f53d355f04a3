//! Fetch coordinator.

use std::collections::HashSet;

use feed_data::{ProviderError, SearchProvider};
use feed_model::{Product, ProductId};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::extract::extract_page;
use crate::{FetchError, PageCursor};

/// Why a `fetch_next` call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A fetch is already in flight.
    InFlight,
    /// No more pages for this term.
    Exhausted,
    /// The search term is empty.
    NoTerm,
}

/// Result of a `fetch_next` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No request was issued.
    Skipped(SkipReason),
    /// A page was applied.
    Appended {
        /// Products that were not already accumulated.
        added: usize,
        /// Accumulated product count after the page.
        accumulated: usize,
        /// Whether more pages may exist.
        has_more: bool,
    },
    /// The provider returned an empty page; pagination is finished.
    Exhausted,
    /// The term was reset while the request was in flight; the response was ignored.
    Discarded,
}

/// Counters kept by the coordinator across terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Requests sent to the provider.
    pub requests_issued: u64,
    /// Responses applied to the product list.
    pub responses_applied: u64,
    /// Responses dropped because their token was stale.
    pub stale_discarded: u64,
    /// Requests that ended in a `FetchError`.
    pub failures: u64,
}

/// Point-in-time copy of the coordinator's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchSnapshot {
    /// Current search term.
    pub term: String,
    /// Accumulated products.
    pub products: Vec<Product>,
    /// Page cursor.
    pub cursor: PageCursor,
    /// Error that stopped pagination, if any.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_message")]
    pub error: Option<FetchError>,
}

fn error_message<S: serde::Serializer>(e: &Option<FetchError>, s: S) -> Result<S::Ok, S::Error> {
    match e {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}

#[derive(Debug, Default)]
struct FetchState {
    term: String,
    products: Vec<Product>,
    ids: HashSet<ProductId>,
    cursor: PageCursor,
    error: Option<FetchError>,
    /// Bumped on every request and every reset.
    token: u64,
    stats: FetchStats,
}

impl FetchState {
    fn skip_reason(&self) -> Option<SkipReason> {
        if self.cursor.is_fetching {
            Some(SkipReason::InFlight)
        } else if !self.cursor.has_more {
            Some(SkipReason::Exhausted)
        } else if self.term.trim().is_empty() {
            Some(SkipReason::NoTerm)
        } else {
            None
        }
    }

    fn is_pristine_for(&self, term: &str) -> bool {
        self.term == term
            && self.cursor.is_pristine()
            && self.products.is_empty()
            && self.error.is_none()
    }

    fn fail(&mut self, error: FetchError) -> FetchError {
        self.cursor.has_more = false;
        self.error = Some(error.clone());
        self.stats.failures += 1;
        error
    }
}

/// Clears `is_fetching` when a request ends, however it ends.
///
/// Only touches the cursor if no reset happened since the request started.
struct InFlight<'a> {
    state: &'a Mutex<FetchState>,
    token: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.token == self.token {
            state.cursor.is_fetching = false;
        }
    }
}

/// Owns paged retrieval of products for one search term at a time.
///
/// At most one request is in flight. Every request carries a token; `reset`
/// invalidates outstanding tokens so late responses for an old term are
/// discarded on arrival. There is no abort: the request runs to completion
/// and its result is ignored.
#[derive(Debug)]
pub struct FetchCoordinator<P> {
    provider: P,
    state: Mutex<FetchState>,
}

impl<P: SearchProvider> FetchCoordinator<P> {
    /// Create a coordinator with no term.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: Mutex::new(FetchState::default()),
        }
    }

    /// Switch to `term`: clear products, rewind to page 1, clear the error.
    ///
    /// Calling it again with the same term before anything was fetched is a
    /// no-op. Returns whether state changed.
    pub fn reset(&self, term: impl Into<String>) -> bool {
        let term = term.into();
        let mut state = self.state.lock();
        if state.is_pristine_for(&term) {
            return false;
        }

        if state.cursor.is_fetching {
            tracing::debug!(old = %state.term, new = %term, "reset while a fetch is in flight");
        }

        state.term = term;
        state.products.clear();
        state.ids.clear();
        state.cursor = PageCursor::first();
        state.error = None;
        state.token += 1;
        true
    }

    /// Fetch the next page for the current term.
    ///
    /// No-op while a fetch is in flight, after exhaustion, or with an empty
    /// term. On failure the error is recorded, pagination stops, and the
    /// error is returned.
    pub async fn fetch_next(&self) -> Result<FetchOutcome, FetchError> {
        let (token, term, page) = {
            let mut state = self.state.lock();
            if let Some(reason) = state.skip_reason() {
                tracing::trace!(?reason, "fetch skipped");
                return Ok(FetchOutcome::Skipped(reason));
            }
            state.token += 1;
            state.cursor.is_fetching = true;
            state.stats.requests_issued += 1;
            (state.token, state.term.clone(), state.cursor.page)
        };

        let _in_flight = InFlight {
            state: &self.state,
            token,
        };

        tracing::debug!(%term, page, "fetching page");
        let response = self.provider.search(&term, page).await;
        self.apply(token, &term, page, response)
    }

    fn apply(
        &self,
        token: u64,
        term: &str,
        page: u32,
        response: Result<Value, ProviderError>,
    ) -> Result<FetchOutcome, FetchError> {
        let mut state = self.state.lock();
        if state.token != token {
            state.stats.stale_discarded += 1;
            tracing::debug!(%term, page, current = %state.term, "discarding stale response");
            return Ok(FetchOutcome::Discarded);
        }
        state.cursor.is_fetching = false;

        let extracted = response
            .map_err(FetchError::from)
            .and_then(|body| extract_page(&body));
        let extracted = match extracted {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::error!(%term, page, error = %e, "failed to load products");
                return Err(state.fail(e));
            }
        };
        state.stats.responses_applied += 1;

        if extracted.is_empty() {
            if page == 1 && state.products.is_empty() {
                tracing::info!(%term, "no products found");
                return Err(state.fail(FetchError::EmptyResult {
                    term: term.to_string(),
                }));
            }
            state.cursor.has_more = false;
            return Ok(FetchOutcome::Exhausted);
        }

        let before = state.products.len();
        for product in extracted.products {
            if state.ids.insert(product.id.clone()) {
                state.products.push(product);
            }
        }
        let added = state.products.len() - before;
        let accumulated = state.products.len();
        state.cursor.page += 1;

        let reached_total = extracted
            .total
            .is_some_and(|total| accumulated as u64 >= total);
        if added == 0 || reached_total {
            state.cursor.has_more = false;
        }

        tracing::debug!(%term, page, added, accumulated, has_more = state.cursor.has_more, "page applied");
        Ok(FetchOutcome::Appended {
            added,
            accumulated,
            has_more: state.cursor.has_more,
        })
    }
}

impl<P> FetchCoordinator<P> {
    /// Current search term.
    pub fn term(&self) -> String {
        self.state.lock().term.clone()
    }

    /// Current cursor.
    pub fn cursor(&self) -> PageCursor {
        self.state.lock().cursor
    }

    /// Check if a fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.state.lock().cursor.is_fetching
    }

    /// Check if more pages may exist.
    pub fn has_more(&self) -> bool {
        self.state.lock().cursor.has_more
    }

    /// The error that stopped pagination, if any.
    pub fn error(&self) -> Option<FetchError> {
        self.state.lock().error.clone()
    }

    /// Number of accumulated products.
    pub fn product_count(&self) -> usize {
        self.state.lock().products.len()
    }

    /// Copy of the accumulated products.
    pub fn products(&self) -> Vec<Product> {
        self.state.lock().products.clone()
    }

    /// Run `f` over the accumulated products without copying them.
    pub fn with_products<R>(&self, f: impl FnOnce(&[Product]) -> R) -> R {
        f(&self.state.lock().products)
    }

    /// Copy of the whole state.
    pub fn snapshot(&self) -> FetchSnapshot {
        let state = self.state.lock();
        FetchSnapshot {
            term: state.term.clone(),
            products: state.products.clone(),
            cursor: state.cursor,
            error: state.error.clone(),
        }
    }

    /// Counters.
    pub fn stats(&self) -> FetchStats {
        self.state.lock().stats
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use feed_data::InMemoryProvider;
    use serde_json::json;

    use super::*;

    fn coordinator(provider: InMemoryProvider, term: &str) -> FetchCoordinator<InMemoryProvider> {
        let coordinator = FetchCoordinator::new(provider);
        coordinator.reset(term);
        coordinator
    }

    #[tokio::test]
    async fn test_pages_until_total_reached() {
        let c = coordinator(InMemoryProvider::demo("shoes", 45, 20), "shoes");

        let first = c.fetch_next().await.unwrap();
        assert_eq!(
            first,
            FetchOutcome::Appended { added: 20, accumulated: 20, has_more: true }
        );
        assert_eq!(c.cursor().page, 2);

        let second = c.fetch_next().await.unwrap();
        assert_eq!(
            second,
            FetchOutcome::Appended { added: 20, accumulated: 40, has_more: true }
        );

        let third = c.fetch_next().await.unwrap();
        assert_eq!(
            third,
            FetchOutcome::Appended { added: 5, accumulated: 45, has_more: false }
        );
        assert!(!c.has_more());
        assert_eq!(c.cursor().page, 4);
    }

    #[tokio::test]
    async fn test_no_requests_after_exhaustion() {
        let c = coordinator(InMemoryProvider::demo("shoes", 5, 20), "shoes");
        c.fetch_next().await.unwrap();
        assert!(!c.has_more());

        for _ in 0..3 {
            assert_eq!(
                c.fetch_next().await.unwrap(),
                FetchOutcome::Skipped(SkipReason::Exhausted)
            );
        }
        assert_eq!(c.provider().request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_while_in_flight_is_noop() {
        let provider = InMemoryProvider::demo("shoes", 45, 20).with_latency(Duration::from_millis(50));
        let c = coordinator(provider, "shoes");

        let (first, second) = tokio::join!(c.fetch_next(), c.fetch_next());
        assert!(matches!(first.unwrap(), FetchOutcome::Appended { .. }));
        assert_eq!(second.unwrap(), FetchOutcome::Skipped(SkipReason::InFlight));
        assert_eq!(c.provider().request_count(), 1);
        assert!(!c.is_fetching());
    }

    #[tokio::test]
    async fn test_empty_term_is_noop() {
        let c = FetchCoordinator::new(InMemoryProvider::demo("shoes", 5, 5));
        assert_eq!(
            c.fetch_next().await.unwrap(),
            FetchOutcome::Skipped(SkipReason::NoTerm)
        );
        assert_eq!(c.provider().request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_late_response() {
        let provider = InMemoryProvider::demo("shoes", 45, 20)
            .with_catalog("boots", vec![json!({"id": "b1", "name": "Boot"})])
            .with_latency(Duration::from_millis(100));
        let c = coordinator(provider, "shoes");

        let (late, _) = tokio::join!(c.fetch_next(), async {
            assert!(c.reset("boots"));
        });

        assert_eq!(late.unwrap(), FetchOutcome::Discarded);
        let snapshot = c.snapshot();
        assert_eq!(snapshot.term, "boots");
        assert!(snapshot.products.is_empty());
        assert_eq!(snapshot.cursor, PageCursor::first());
        assert_eq!(c.stats().stale_discarded, 1);

        c.fetch_next().await.unwrap();
        assert_eq!(c.products()[0].id.as_str(), "b1");
    }

    #[tokio::test]
    async fn test_reset_same_term_is_idempotent() {
        let c = FetchCoordinator::new(InMemoryProvider::new(5));
        assert!(c.reset("shoes"));
        assert!(!c.reset("shoes"));
        assert!(c.reset("boots"));
    }

    #[tokio::test]
    async fn test_failure_stops_pagination() {
        let provider = InMemoryProvider::demo("shoes", 45, 20).failing_on("shoes", 2);
        let c = coordinator(provider, "shoes");

        c.fetch_next().await.unwrap();
        let err = c.fetch_next().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(c.error(), Some(err));
        assert!(!c.has_more());
        assert!(!c.is_fetching());
        assert_eq!(c.product_count(), 20);

        c.fetch_next().await.unwrap();
        assert_eq!(c.provider().request_count(), 2);
        assert_eq!(c.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_reset_clears_error() {
        let provider = InMemoryProvider::demo("shoes", 5, 5).failing_on("shoes", 1);
        let c = coordinator(provider, "shoes");
        assert!(c.fetch_next().await.is_err());

        c.reset("shoes");
        assert!(c.error().is_none());
        assert!(c.has_more());
    }

    #[tokio::test]
    async fn test_empty_first_page_is_empty_result() {
        let c = coordinator(InMemoryProvider::new(20), "unicorns");
        let err = c.fetch_next().await.unwrap_err();
        assert_eq!(err, FetchError::EmptyResult { term: "unicorns".into() });
        assert!(!c.has_more());
    }

    #[tokio::test]
    async fn test_empty_later_page_is_exhaustion() {
        // Total of zero means "unknown", so only an empty page ends paging.
        let provider = InMemoryProvider::demo("shoes", 20, 20).with_total(0);
        let c = coordinator(provider, "shoes");

        assert!(matches!(
            c.fetch_next().await.unwrap(),
            FetchOutcome::Appended { has_more: true, .. }
        ));
        assert_eq!(c.fetch_next().await.unwrap(), FetchOutcome::Exhausted);
        assert!(!c.has_more());
        assert!(c.error().is_none());
    }

    #[tokio::test]
    async fn test_duplicates_are_dropped() {
        let items = vec![
            json!({"id": "a"}),
            json!({"id": "b"}),
            json!({"id": "b"}),
            json!({"id": "c"}),
        ];
        let provider = InMemoryProvider::new(2).with_catalog("x", items).with_total(10);
        let c = coordinator(provider, "x");

        c.fetch_next().await.unwrap();
        let outcome = c.fetch_next().await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Appended { added: 1, accumulated: 3, has_more: true }
        );
        let ids: Vec<_> = c.products().into_iter().map(|p| p.id.into_inner()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_page_of_only_duplicates_ends_paging() {
        let items = vec![json!({"id": "a"}), json!({"id": "a"})];
        let provider = InMemoryProvider::new(1).with_catalog("x", items).with_total(10);
        let c = coordinator(provider, "x");

        c.fetch_next().await.unwrap();
        assert_eq!(
            c.fetch_next().await.unwrap(),
            FetchOutcome::Appended { added: 0, accumulated: 1, has_more: false }
        );
    }

    #[tokio::test]
    async fn test_fallback_path_is_used() {
        let provider = InMemoryProvider::demo("shoes", 3, 10).with_fallback_path();
        let c = coordinator(provider, "shoes");
        c.fetch_next().await.unwrap();
        assert_eq!(c.product_count(), 3);
    }

    struct Malformed;

    #[async_trait]
    impl SearchProvider for Malformed {
        async fn search(&self, _keyword: &str, _page: u32) -> Result<Value, ProviderError> {
            Ok(json!({"unexpected": true}))
        }
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let c = FetchCoordinator::new(Malformed);
        c.reset("shoes");
        let err = c.fetch_next().await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
        assert!(!c.has_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_fetch_clears_in_flight() {
        let provider = InMemoryProvider::demo("shoes", 5, 5).with_latency(Duration::from_secs(5));
        let c = coordinator(provider, "shoes");

        let timed_out = tokio::time::timeout(Duration::from_millis(10), c.fetch_next()).await;
        assert!(timed_out.is_err());
        assert!(!c.is_fetching());
        assert!(c.has_more());
    }
}

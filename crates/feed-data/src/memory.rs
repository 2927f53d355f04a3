//! In-memory search provider (for development/testing).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::shape;
use crate::{ProviderError, SearchProvider};

/// Serves fixed catalogs, one per keyword, in fixed-size pages.
///
/// Responses use the provider's nested shape. Every request is recorded so
/// tests can assert on what was asked for.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    catalogs: HashMap<String, Vec<Value>>,
    page_size: usize,
    total_override: Option<u64>,
    use_fallback_path: bool,
    failing_pages: HashSet<(String, u32)>,
    latency: Option<Duration>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl InMemoryProvider {
    /// Create an empty provider with the given page size.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Default::default()
        }
    }

    /// A provider with `count` generated products for `keyword`.
    pub fn demo(keyword: &str, count: usize, page_size: usize) -> Self {
        let items = (1..=count).map(|i| demo_item(keyword, i)).collect();
        Self::new(page_size).with_catalog(keyword, items)
    }

    /// Register the raw items returned for `keyword`.
    pub fn with_catalog(mut self, keyword: impl Into<String>, items: Vec<Value>) -> Self {
        self.catalogs.insert(keyword.into(), items);
        self
    }

    /// Report this total count instead of the catalog length.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total_override = Some(total);
        self
    }

    /// Answer through the fallback item path.
    pub fn with_fallback_path(mut self) -> Self {
        self.use_fallback_path = true;
        self
    }

    /// Fail requests for this keyword and page.
    pub fn failing_on(mut self, keyword: impl Into<String>, page: u32) -> Self {
        self.failing_pages.insert((keyword.into(), page));
        self
    }

    /// Wait this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl SearchProvider for InMemoryProvider {
    async fn search(&self, keyword: &str, page: u32) -> Result<Value, ProviderError> {
        self.requests.lock().push((keyword.to_string(), page));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing_pages.contains(&(keyword.to_string(), page)) {
            return Err(ProviderError::Request(format!(
                "simulated failure for {keyword} page {page}"
            )));
        }

        let catalog = self.catalogs.get(keyword).map(Vec::as_slice).unwrap_or(&[]);
        let start = (page.max(1) as usize - 1) * self.page_size;
        let items: Vec<Value> = catalog
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let total = self.total_override.unwrap_or(catalog.len() as u64);

        Ok(if self.use_fallback_path {
            shape::fallback_response(items, total)
        } else {
            shape::primary_response(items, total)
        })
    }
}

fn demo_item(keyword: &str, index: usize) -> Value {
    json!({
        "id": format!("{keyword}-{index}"),
        "name": format!("{keyword} #{index}"),
        "price": 5.0 + (index % 20) as f64 * 2.5,
        "image": format!("https://img.example.com/{keyword}/{index}.jpg"),
        "thumbnailImage": format!("https://img.example.com/{keyword}/{index}-thumb.jpg"),
        "description": format!("Demo {keyword} product number {index}"),
        "stock": (index % 7) as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_catalog() {
        let provider = InMemoryProvider::demo("shoes", 45, 20);

        let page3 = provider.search("shoes", 3).await.unwrap();
        let items = page3.pointer(shape::PRIMARY_ITEMS).unwrap().as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(page3.pointer(shape::TOTAL_COUNT).unwrap().as_u64(), Some(45));
        assert_eq!(provider.requests(), vec![("shoes".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_unknown_keyword_is_empty() {
        let provider = InMemoryProvider::new(10);
        let response = provider.search("nothing", 1).await.unwrap();
        let items = response.pointer(shape::PRIMARY_ITEMS).unwrap().as_array().unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_failing_page() {
        let provider = InMemoryProvider::demo("shoes", 10, 5).failing_on("shoes", 2);
        assert!(provider.search("shoes", 1).await.is_ok());
        let err = provider.search("shoes", 2).await.unwrap_err();
        assert!(err.is_transport());
    }
}

//! The search provider seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::ProviderError;

/// An opaque paginated product search service.
///
/// Returns the provider's nested response untouched; interpreting its shape
/// is the fetch coordinator's job.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search products by keyword. Pages are 1-indexed.
    async fn search(&self, keyword: &str, page: u32) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<P: SearchProvider + ?Sized> SearchProvider for std::sync::Arc<P> {
    async fn search(&self, keyword: &str, page: u32) -> Result<Value, ProviderError> {
        (**self).search(keyword, page).await
    }
}

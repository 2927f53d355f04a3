//! Search provider over HTTP.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::{ProviderError, SearchProvider, TimeoutConfig};

/// Default search endpoint path.
pub const DEFAULT_SEARCH_PATH: &str = "/wlm/walmart-search-by-keyword";

/// Searches a keyword/page endpoint over HTTP.
///
/// Default headers (credentials, host) are attached to every request.
/// Transport failures, timeouts and non-2xx statuses come back as
/// transport-class [`ProviderError`]s; a non-JSON body is a decode error.
#[derive(Debug, Clone)]
pub struct HttpSearchProvider {
    client: reqwest::Client,
    base_url: String,
    search_path: String,
}

impl HttpSearchProvider {
    /// Start building a provider for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> HttpSearchProviderBuilder {
        HttpSearchProviderBuilder {
            base_url: base_url.into(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            default_headers: HashMap::new(),
            timeout: TimeoutConfig::default(),
        }
    }

    /// Full URL of the search endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.search_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, keyword: &str, page: u32) -> Result<Value, ProviderError> {
        let url = self.endpoint();
        tracing::debug!(%url, keyword, page, "searching products");

        let response = self
            .client
            .get(&url)
            .query(&[("keyword", keyword), ("page", &page.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Builder for [`HttpSearchProvider`].
#[derive(Debug, Clone)]
pub struct HttpSearchProviderBuilder {
    base_url: String,
    search_path: String,
    default_headers: HashMap<String, String>,
    timeout: TimeoutConfig,
}

impl HttpSearchProviderBuilder {
    /// Override the search endpoint path.
    pub fn search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = path.into();
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set timeouts.
    pub fn timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the provider.
    pub fn build(self) -> Result<HttpSearchProvider, ProviderError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProviderError::InvalidConfig(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        for (key, value) in &self.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ProviderError::InvalidConfig(format!("header {key}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProviderError::InvalidConfig(format!("header {key}: {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(self.timeout.connect)
            .timeout(self.timeout.total)
            .build()
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;

        Ok(HttpSearchProvider {
            client,
            base_url: self.base_url,
            search_path: self.search_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let provider = HttpSearchProvider::builder("https://api.example.com/")
            .build()
            .unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://api.example.com/wlm/walmart-search-by-keyword"
        );

        let provider = HttpSearchProvider::builder("https://api.example.com")
            .search_path("search")
            .build()
            .unwrap();
        assert_eq!(provider.endpoint(), "https://api.example.com/search");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = HttpSearchProvider::builder("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let err = HttpSearchProvider::builder("https://api.example.com")
            .default_header("x-api-key", "bad\nvalue")
            .build()
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }
}

//! Feed configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use feed_data::{HttpSearchProvider, TimeoutConfig, DEFAULT_SEARCH_PATH};
use feed_image::{
    EvictionPolicy, HttpImageLoader, ImageCache, ImageLoader, PreloadConfig, DEFAULT_CAPACITY,
    DEFAULT_MAX_AGE, DEFAULT_MAX_WIDTH,
};
use feed_observability::LogSettings;
use feed_reveal::RevealConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// File names searched for, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["feed.toml", ".feed.toml", "feed.json"];

/// Root configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Remote search service.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Search input handling.
    #[serde(default)]
    pub search: SearchConfig,

    /// Progressive reveal of the product grid.
    #[serde(default = "RevealConfig::product_grid")]
    pub reveal: RevealConfig,

    /// Image cache and preloading.
    #[serde(default)]
    pub images: ImageConfig,

    /// Infinite scroll.
    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub logging: LogSettings,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            search: SearchConfig::default(),
            reveal: RevealConfig::product_grid(),
            images: ImageConfig::default(),
            scroll: ScrollConfig::default(),
            logging: LogSettings::default(),
        }
    }
}

impl FeedConfig {
    /// Load config from a file. `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if is_json(path) {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Save config to a file, in the format its extension names.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Remote search service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Service base URL.
    pub base_url: String,
    /// Value of the `x-rapidapi-host` header. Derived from `base_url` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub search_path: String,
    pub timeout: TimeoutConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://axesso-walmart-data-service.p.rapidapi.com".to_string(),
            host: None,
            api_key_env: "RAPIDAPI_KEY".to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            timeout: TimeoutConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Host header value.
    pub fn host_header(&self) -> String {
        match &self.host {
            Some(host) => host.clone(),
            None => self
                .base_url
                .split("://")
                .nth(1)
                .unwrap_or(self.base_url.as_str())
                .split(['/', ':'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Build the HTTP provider, reading the API key from the environment.
    pub fn build_http(&self) -> Result<HttpSearchProvider, ConfigError> {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))?;
        self.build_http_with_key(&api_key)
    }

    /// Build the HTTP provider with an explicit API key.
    pub fn build_http_with_key(&self, api_key: &str) -> Result<HttpSearchProvider, ConfigError> {
        let provider = HttpSearchProvider::builder(&self.base_url)
            .search_path(&self.search_path)
            .default_header("x-rapidapi-key", api_key)
            .default_header("x-rapidapi-host", self.host_header())
            .default_header("content-type", "application/json")
            .timeout(self.timeout)
            .build()?;
        Ok(provider)
    }
}

/// Search input settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a typed term is searched.
    #[serde(rename = "debounce_ms", with = "feed_model::millis")]
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

/// Image cache and preload settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub capacity: usize,
    pub eviction: EvictionPolicy,
    /// Decoded images wider than this are downscaled. 0 keeps originals.
    pub max_width: u32,
    /// Images per preload batch.
    pub batch_size: usize,
    /// Delay before the rest of a list is preloaded.
    #[serde(rename = "deferred_delay_ms", with = "feed_model::millis")]
    pub deferred_delay: Duration,
    /// Entries idle longer than this are dropped by periodic cleanup.
    #[serde(rename = "cleanup_max_age_ms", with = "feed_model::millis")]
    pub cleanup_max_age: Duration,
    /// Per-image download timeout.
    #[serde(rename = "timeout_ms", with = "feed_model::millis")]
    pub timeout: Duration,
}

impl Default for ImageConfig {
    fn default() -> Self {
        let preload = PreloadConfig::default();
        Self {
            capacity: DEFAULT_CAPACITY,
            eviction: EvictionPolicy::default(),
            max_width: DEFAULT_MAX_WIDTH,
            batch_size: preload.batch_size,
            deferred_delay: preload.deferred_delay,
            cleanup_max_age: DEFAULT_MAX_AGE,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ImageConfig {
    pub fn preload(&self) -> PreloadConfig {
        PreloadConfig {
            batch_size: self.batch_size,
            deferred_delay: self.deferred_delay,
        }
    }

    /// A cache of the configured size and policy over `loader`.
    pub fn build_cache(&self, loader: Arc<dyn ImageLoader>) -> Arc<ImageCache> {
        Arc::new(ImageCache::new(self.capacity, loader).with_policy(self.eviction))
    }

    /// An HTTP image loader with the configured timeout and width.
    pub fn http_loader(&self) -> Result<HttpImageLoader, ConfigError> {
        let max_width = (self.max_width > 0).then_some(self.max_width);
        Ok(HttpImageLoader::with_timeout(self.timeout)?.max_width(max_width))
    }
}

/// Infinite scroll settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Fetch the next page once the content end is this close to the viewport bottom.
    pub threshold_px: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { threshold_px: 300.0 }
    }
}

//! Error types for the catalog session.

use std::path::PathBuf;

use feed_cart::CartError;
use feed_data::ProviderError;
use feed_fetch::FetchError;
use feed_image::ImageLoadError;
use thiserror::Error;

/// Errors loading, saving or applying configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("Config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML could not be parsed.
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML could not be written.
    #[error("Failed to serialize TOML config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON could not be parsed or written.
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The API key environment variable is not set.
    #[error("Environment variable {0} is not set")]
    MissingApiKey(String),

    /// The search provider could not be built.
    #[error("Provider configuration: {0}")]
    Provider(#[from] ProviderError),

    /// The image loader could not be built.
    #[error("Image loader configuration: {0}")]
    Image(#[from] ImageLoadError),
}

/// Errors surfaced by [`CatalogSession`](crate::CatalogSession).
#[derive(Error, Debug)]
pub enum FeedError {
    /// Pagination stopped for the current term.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A cart payload was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

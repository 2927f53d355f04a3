//! Image loading errors.

use thiserror::Error;

/// Why a single image could not be loaded.
///
/// Batch preloading swallows these per URL; only `ImageCache::preload`
/// returns them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageLoadError {
    /// The download failed.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    /// The bytes are not a decodable image.
    #[error("Failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The HTTP client could not be built.
    #[error("Image client error: {0}")]
    Client(String),
}

impl ImageLoadError {
    /// The URL the error refers to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Fetch { url, .. } | Self::Http { url, .. } | Self::Decode { url, .. } => Some(url),
            Self::Client(_) => None,
        }
    }
}

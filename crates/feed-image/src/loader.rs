//! Downloading and decoding images.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::ImageLoadError;

/// Widest image kept in the cache; anything larger is downscaled.
pub const DEFAULT_MAX_WIDTH: u32 = 300;

/// A decoded image ready for display.
#[derive(Clone)]
pub struct DecodedImage {
    url: String,
    image: Arc<DynamicImage>,
}

impl DecodedImage {
    /// Wrap an already decoded image.
    pub fn new(url: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            url: url.into(),
            image: Arc::new(image),
        }
    }

    /// Source URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel data.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("url", &self.url)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Shared handle to a cached image.
pub type ImageHandle = Arc<DecodedImage>;

/// Source of decoded images.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load and decode the image at `url`.
    async fn load(&self, url: &str) -> Result<DecodedImage, ImageLoadError>;
}

#[async_trait]
impl<L: ImageLoader + ?Sized> ImageLoader for Arc<L> {
    async fn load(&self, url: &str) -> Result<DecodedImage, ImageLoadError> {
        (**self).load(url).await
    }
}

/// Fetches images over HTTP and decodes them off the async runtime.
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: reqwest::Client,
    max_width: Option<u32>,
}

impl HttpImageLoader {
    /// Use an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_width: Some(DEFAULT_MAX_WIDTH),
        }
    }

    /// Build a client with the given request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ImageLoadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageLoadError::Client(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Downscale wider images to this width. `None` keeps originals.
    pub fn max_width(mut self, max_width: Option<u32>) -> Self {
        self.max_width = max_width;
        self
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<DecodedImage, ImageLoadError> {
        let fetch_err = |e: reqwest::Error| ImageLoadError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageLoadError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(fetch_err)?;

        let max_width = self.max_width;
        let decoded = tokio::task::spawn_blocking(move || decode(&bytes, max_width))
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result);

        match decoded {
            Ok(image) => {
                tracing::trace!(url, width = image.width(), height = image.height(), "image decoded");
                Ok(DecodedImage::new(url, image))
            }
            Err(reason) => Err(ImageLoadError::Decode {
                url: url.to_string(),
                reason,
            }),
        }
    }
}

/// Answers every URL with a blank image of a fixed size (for development/testing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderLoader {
    pub width: u32,
    pub height: u32,
}

impl Default for PlaceholderLoader {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAX_WIDTH,
            height: DEFAULT_MAX_WIDTH,
        }
    }
}

#[async_trait]
impl ImageLoader for PlaceholderLoader {
    async fn load(&self, url: &str) -> Result<DecodedImage, ImageLoadError> {
        Ok(DecodedImage::new(url, DynamicImage::new_rgba8(self.width, self.height)))
    }
}

/// Decode `bytes` and downscale to `max_width` if wider.
pub fn decode(bytes: &[u8], max_width: Option<u32>) -> Result<DynamicImage, String> {
    let image = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    Ok(match max_width {
        Some(max) => downscale(image, max),
        None => image,
    })
}

/// Shrink `image` to `max_width`, keeping its aspect ratio.
pub fn downscale(image: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if max_width == 0 || width <= max_width {
        return image;
    }
    let scaled_height = (u64::from(height) * u64::from(max_width) / u64::from(width)).max(1) as u32;
    image.resize_exact(max_width, scaled_height, FilterType::Triangle)
}

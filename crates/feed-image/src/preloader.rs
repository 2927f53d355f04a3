//! Warming the image cache for a product list.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::{AbortHandle, JoinHandle};

use crate::{BatchReport, ImageCache};

/// When and how much to preload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    /// Images per batch. The first warm loads two batches right away.
    pub batch_size: usize,
    /// Delay before the rest of the list is loaded.
    #[serde(rename = "deferred_delay_ms", with = "feed_model::millis")]
    pub deferred_delay: Duration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            deferred_delay: Duration::from_secs(3),
        }
    }
}

/// Preloads product images once per product list.
///
/// The first `warm` after construction or `reset` loads the first two
/// batches immediately and schedules the remainder after the deferred delay.
/// Later calls are ignored until the next `reset`. Resetting or dropping the
/// preloader cancels every batch it started that is still loading, so a
/// previous list never refills the cache.
#[derive(Debug)]
pub struct ImagePreloader {
    cache: Arc<ImageCache>,
    config: PreloadConfig,
    started: bool,
    deferred: Option<JoinHandle<BatchReport>>,
    running: Vec<AbortHandle>,
}

impl ImagePreloader {
    pub fn new(cache: Arc<ImageCache>, config: PreloadConfig) -> Self {
        Self {
            cache,
            config,
            started: false,
            deferred: None,
            running: Vec::new(),
        }
    }

    /// Start preloading the images of a product list.
    ///
    /// `images` yields one optional URL per product, in display order.
    /// Returns the immediate batch task, or `None` if nothing was started.
    pub fn warm<'a, I>(&mut self, images: I) -> Option<JoinHandle<BatchReport>>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        if self.started {
            return None;
        }

        let mut urls: Vec<String> = images.into_iter().flatten().map(str::to_string).collect();
        if urls.is_empty() {
            return None;
        }
        self.started = true;

        let head_len = urls.len().min(self.config.batch_size.max(1) * 2);
        let rest = urls.split_off(head_len);
        tracing::debug!(
            immediate = urls.len(),
            deferred = rest.len(),
            "warming image cache"
        );

        if !rest.is_empty() {
            let cache = Arc::clone(&self.cache);
            let delay = self.config.deferred_delay;
            self.deferred = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                cache.preload_batch(rest).await
            }));
        }

        Some(self.spawn(urls))
    }

    /// Preload one batch of images starting at product index `start`.
    ///
    /// Products without an image inside the window are skipped, not replaced.
    pub fn preload_next_batch<'a, I>(
        &mut self,
        images: I,
        start: usize,
    ) -> Option<JoinHandle<BatchReport>>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let urls: Vec<String> = images
            .into_iter()
            .skip(start)
            .take(self.config.batch_size.max(1))
            .flatten()
            .map(str::to_string)
            .collect();

        if urls.is_empty() {
            return None;
        }
        Some(self.spawn(urls))
    }

    /// Cancel every unfinished batch and accept the next `warm`.
    pub fn reset(&mut self) {
        self.cancel();
        self.started = false;
    }

    /// Check if a list has been warmed since the last reset.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Check if any batch is still waiting or running.
    pub fn has_pending(&self) -> bool {
        self.deferred.as_ref().is_some_and(|d| !d.is_finished())
            || self.running.iter().any(|r| !r.is_finished())
    }

    pub fn config(&self) -> &PreloadConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    fn spawn(&mut self, urls: Vec<String>) -> JoinHandle<BatchReport> {
        self.running.retain(|r| !r.is_finished());
        let batch = self.cache.spawn_preload_batch(urls);
        self.running.push(batch.abort_handle());
        batch
    }

    fn cancel(&mut self) {
        if let Some(deferred) = self.deferred.take() {
            deferred.abort();
        }
        let mut cancelled = 0;
        for batch in self.running.drain(..) {
            if !batch.is_finished() {
                batch.abort();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled image preload batches");
        }
    }
}

impl Drop for ImagePreloader {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use image::DynamicImage;
    use parking_lot::Mutex;

    use super::*;
    use crate::{DecodedImage, ImageLoadError, ImageLoader};

    #[derive(Default)]
    struct RecordingLoader {
        urls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ImageLoader for RecordingLoader {
        async fn load(&self, url: &str) -> Result<DecodedImage, ImageLoadError> {
            self.urls.lock().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(DecodedImage::new(url, DynamicImage::new_rgb8(1, 1)))
        }
    }

    fn setup(batch_size: usize) -> (Arc<RecordingLoader>, ImagePreloader) {
        let loader = Arc::new(RecordingLoader::default());
        let cache = Arc::new(ImageCache::new(100, loader.clone()));
        let config = PreloadConfig {
            batch_size,
            ..Default::default()
        };
        (loader, ImagePreloader::new(cache, config))
    }

    fn images(count: usize) -> Vec<Option<String>> {
        (0..count).map(|i| Some(format!("https://img/{i}.jpg"))).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_loads_head_then_rest() {
        let (loader, mut preloader) = setup(4);
        let list = images(20);

        let head = preloader.warm(list.iter().map(Option::as_deref)).unwrap();
        assert_eq!(head.await.unwrap().loaded, 8);
        assert_eq!(loader.urls.lock().len(), 8);
        assert!(preloader.has_pending());

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(loader.urls.lock().len(), 20);
        assert_eq!(preloader.cache().len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_runs_once_until_reset() {
        let (loader, mut preloader) = setup(4);
        let list = images(3);

        let first = preloader.warm(list.iter().map(Option::as_deref)).unwrap();
        assert!(preloader.warm(list.iter().map(Option::as_deref)).is_none());
        first.await.unwrap();

        preloader.reset();
        let again = preloader.warm(list.iter().map(Option::as_deref)).unwrap();
        again.await.unwrap();
        // Second pass is served from the cache.
        assert_eq!(loader.urls.lock().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_deferred_batch() {
        let (loader, mut preloader) = setup(2);
        let list = images(10);

        preloader
            .warm(list.iter().map(Option::as_deref))
            .unwrap()
            .await
            .unwrap();
        preloader.reset();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(loader.urls.lock().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_running_head_batch() {
        let loader = Arc::new(RecordingLoader {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let cache = Arc::new(ImageCache::new(100, loader.clone()));
        let mut preloader = ImagePreloader::new(Arc::clone(&cache), PreloadConfig::default());
        let list = images(4);

        let head = preloader.warm(list.iter().map(Option::as_deref)).unwrap();
        tokio::task::yield_now().await;
        assert!(preloader.has_pending());

        preloader.reset();
        assert!(head.await.unwrap_err().is_cancelled());
        assert!(!preloader.has_pending());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_deferred_batch() {
        let (loader, mut preloader) = setup(2);
        let list = images(10);

        preloader
            .warm(list.iter().map(Option::as_deref))
            .unwrap()
            .await
            .unwrap();
        drop(preloader);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(loader.urls.lock().len(), 4);
    }

    #[tokio::test]
    async fn test_next_batch_skips_missing_images() {
        let (loader, mut preloader) = setup(3);
        let list = vec![
            Some("a".to_string()),
            Some("b".to_string()),
            None,
            Some("d".to_string()),
            Some("e".to_string()),
        ];

        let report = preloader
            .preload_next_batch(list.iter().map(Option::as_deref), 1)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(report.attempted, 2);

        let mut loaded = loader.urls.lock().clone();
        loaded.sort();
        assert_eq!(loaded, vec!["b", "d"]);
    }

    #[tokio::test]
    async fn test_nothing_to_warm() {
        let (_, mut preloader) = setup(4);
        assert!(preloader.warm([None, None]).is_none());
        assert!(!preloader.is_started());
        assert!(preloader.preload_next_batch(Vec::<Option<&str>>::new(), 0).is_none());
    }
}

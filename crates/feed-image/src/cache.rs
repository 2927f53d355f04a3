//! Bounded URL -> image cache.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{ImageHandle, ImageLoadError, ImageLoader};

/// Default number of cached images.
pub const DEFAULT_CAPACITY: usize = 200;

/// Default age after which `cleanup` drops an entry.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Loads in flight per batch.
pub const PRELOAD_LANES: usize = 5;

/// Which entry goes when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Oldest inserted entry, regardless of reads.
    #[default]
    #[serde(alias = "fifo")]
    Insertion,
    /// Least recently read or written entry.
    Lru,
}

/// Counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub loads: u64,
    pub load_failures: u64,
}

/// Outcome of one preload batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// URLs handed to the batch.
    pub attempted: usize,
    /// URLs now present in the cache.
    pub loaded: usize,
    /// URLs that failed to load.
    pub failed: usize,
}

#[derive(Debug)]
struct CacheEntry {
    handle: ImageHandle,
    last_access: Instant,
}

/// Fixed-capacity image cache keyed by URL.
///
/// Entries are kept in insertion order. Inserting into a full cache evicts
/// the first entry; with [`EvictionPolicy::Lru`] reads move an entry to the
/// back so the least recently used one goes first. Writing an existing URL
/// replaces it in place and never evicts.
pub struct ImageCache {
    capacity: usize,
    policy: EvictionPolicy,
    entries: Mutex<IndexMap<String, CacheEntry>>,
    loader: Arc<dyn ImageLoader>,
    stats: Mutex<CacheStats>,
}

impl ImageCache {
    /// Create a cache holding at most `capacity` images.
    pub fn new(capacity: usize, loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            capacity,
            policy: EvictionPolicy::default(),
            entries: Mutex::new(IndexMap::with_capacity(capacity.min(1024))),
            loader,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Set the eviction policy.
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Look up `url`, refreshing its access time.
    pub fn get(&self, url: &str) -> Option<ImageHandle> {
        let mut entries = self.entries.lock();
        let found = match entries.get_full_mut(url) {
            Some((index, _, entry)) => {
                entry.last_access = Instant::now();
                Some((index, Arc::clone(&entry.handle)))
            }
            None => None,
        };

        let mut stats = self.stats.lock();
        match found {
            Some((index, handle)) => {
                stats.hits += 1;
                if self.policy == EvictionPolicy::Lru {
                    let last = entries.len() - 1;
                    entries.move_index(index, last);
                }
                Some(handle)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Store `handle` under `url`, evicting if the cache is full.
    pub fn set(&self, url: impl Into<String>, handle: ImageHandle) {
        let url = url.into();
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if let Some((index, _, entry)) = entries.get_full_mut(&url) {
            entry.handle = handle;
            entry.last_access = now;
            if self.policy == EvictionPolicy::Lru {
                let last = entries.len() - 1;
                entries.move_index(index, last);
            }
            return;
        }

        if self.capacity == 0 {
            return;
        }

        while entries.len() >= self.capacity {
            match entries.shift_remove_index(0) {
                Some((evicted, _)) => {
                    self.stats.lock().evictions += 1;
                    tracing::trace!(url = %evicted, "image evicted");
                }
                None => break,
            }
        }

        entries.insert(
            url,
            CacheEntry {
                handle,
                last_access: now,
            },
        );
    }

    /// Check for `url` without touching its access time.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Cached URLs, next eviction candidate first.
    pub fn urls(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Drop entries not accessed within `max_age`. A zero age drops all.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();

        if max_age.is_zero() {
            entries.clear();
        } else {
            let now = Instant::now();
            entries.retain(|_, entry| now.duration_since(entry.last_access) <= max_age);
        }

        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = entries.len(), "image cache cleaned up");
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Counters snapshot.
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    /// Return the cached image for `url`, loading it on a miss.
    pub async fn preload(&self, url: &str) -> Result<ImageHandle, ImageLoadError> {
        if let Some(handle) = self.get(url) {
            return Ok(handle);
        }

        match self.loader.load(url).await {
            Ok(image) => {
                let handle: ImageHandle = Arc::new(image);
                self.set(url, Arc::clone(&handle));
                self.stats.lock().loads += 1;
                Ok(handle)
            }
            Err(err) => {
                self.stats.lock().load_failures += 1;
                Err(err)
            }
        }
    }

    /// Preload every URL, at most [`PRELOAD_LANES`] at a time.
    ///
    /// A failed URL is logged and counted; it never stops the others.
    pub async fn preload_batch<I>(&self, urls: I) -> BatchReport
    where
        I: IntoIterator<Item = String>,
    {
        stream::iter(urls)
            .map(|url| async move { self.preload(&url).await })
            .buffer_unordered(PRELOAD_LANES)
            .fold(BatchReport::default(), |mut report, result| async move {
                report.attempted += 1;
                match result {
                    Ok(_) => report.loaded += 1,
                    Err(err) => {
                        tracing::debug!(url = err.url(), error = %err, "image preload failed");
                        report.failed += 1;
                    }
                }
                report
            })
            .await
    }

    /// Run [`preload_batch`](Self::preload_batch) on a background task.
    pub fn spawn_preload_batch(self: &Arc<Self>, urls: Vec<String>) -> JoinHandle<BatchReport> {
        let cache = Arc::clone(self);
        tokio::spawn(async move { cache.preload_batch(urls).await })
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("len", &self.len())
            .finish()
    }
}

//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use feed_core::{FeedConfig, CONFIG_FILE_NAMES};
use feed_data::{InMemoryProvider, SearchProvider};
use feed_image::{ImageCache, ImageLoader, PlaceholderLoader};

use crate::output::Output;

/// Products in the offline demo catalog.
pub const OFFLINE_CATALOG_SIZE: usize = 60;

/// Page size of the offline demo catalog.
pub const OFFLINE_PAGE_SIZE: usize = 20;

/// Execution context for CLI commands.
pub struct Context {
    /// Feed configuration.
    pub config: FeedConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let config = FeedConfig::load(path)
                    .with_context(|| format!("Failed to load config: {path}"))?;
                (config, Some(PathBuf::from(path)))
            }
            None => match Self::find_config(&cwd) {
                Some((path, config)) => (config, Some(path)),
                None => (FeedConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find a config file in the directory tree.
    fn find_config(start: &Path) -> Option<(PathBuf, FeedConfig)> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    match FeedConfig::load(&path) {
                        Ok(config) => return Some((path, config)),
                        Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring config file"),
                    }
                }
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// The search provider: the demo catalog offline, HTTP otherwise.
    pub fn provider(&self, offline: bool, term: &str) -> Result<Arc<dyn SearchProvider>> {
        if offline {
            self.output.debug(&format!(
                "Using offline catalog of {OFFLINE_CATALOG_SIZE} products for '{term}'"
            ));
            return Ok(Arc::new(InMemoryProvider::demo(
                term.trim(),
                OFFLINE_CATALOG_SIZE,
                OFFLINE_PAGE_SIZE,
            )));
        }

        let provider = self
            .config
            .provider
            .build_http()
            .context("Failed to set up the search provider (use --offline to run without one)")?;
        self.output.debug(&format!("Searching {}", provider.endpoint()));
        Ok(Arc::new(provider))
    }

    /// The image cache, downloading real images only when asked to.
    pub fn image_cache(&self, download: bool) -> Result<Arc<ImageCache>> {
        let loader: Arc<dyn ImageLoader> = if download {
            Arc::new(
                self.config
                    .images
                    .http_loader()
                    .context("Failed to set up the image loader")?,
            )
        } else {
            Arc::new(PlaceholderLoader::default())
        };
        Ok(self.config.images.build_cache(loader))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

//! Hot-swappable configuration shared between readers.

use crate::loader::ConfigLoader;
use crate::schema::Config;
use arc_swap::ArcSwap;
use std::sync::Arc;
use svetu_common::Result;
use tracing::{debug, info};

/// Current configuration behind an `ArcSwap`: readers never block, and a
/// replacement is only installed once it validates.
#[derive(Debug)]
pub struct ConfigCache {
    current: ArcSwap<Config>,
}

impl ConfigCache {
    /// Wraps an initial configuration.
    pub fn new(config: Config) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Snapshot of the current configuration.
    pub fn get(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// Installs `config` and returns the one it replaced.
    ///
    /// # Errors
    ///
    /// Returns the validation error and keeps the previous configuration.
    pub fn update(&self, config: Config) -> Result<Arc<Config>> {
        config.validate()?;
        Ok(self.current.swap(Arc::new(config)))
    }

    /// Applies `edit` to a copy of the current configuration and installs
    /// the result.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigCache::update`].
    pub fn modify(&self, edit: impl FnOnce(&mut Config)) -> Result<Arc<Config>> {
        let mut next = Config::clone(&self.get());
        edit(&mut next);
        self.update(next)
    }

    /// Re-reads the file behind `loader`. Returns `true` if the
    /// configuration changed.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be loaded or does not validate; the
    /// previous configuration stays in place.
    pub async fn reload(&self, loader: &ConfigLoader) -> Result<bool> {
        let loaded = loader.read().await?;
        if *self.get() == loaded {
            debug!("Configuration at {} unchanged", loader.path().display());
            return Ok(false);
        }

        self.update(loaded)?;
        info!("Reloaded configuration from {}", loader.path().display());
        Ok(true)
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

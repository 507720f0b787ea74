//! Configuration service implementation.
//!
//! Loads the application configuration from a TOML file
//! (`~/.config/lantern/config.toml` by default) and caches it.

use crate::storage::AtomicTomlFile;
use lantern_core::config::LanternConfig;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the application config.
///
/// The file is read once on first access; later reads come from the
/// cache until it is invalidated.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<LanternConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the given file.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading from the standard platform location.
    pub fn with_default_path() -> Result<Self, crate::paths::PathError> {
        Ok(Self::new(crate::paths::LanternPaths::config_file()?))
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file is written out with default values so users have
    /// something to edit. Unreadable or malformed files fall back to the
    /// defaults for this run.
    pub fn get_config(&self) -> LanternConfig {
        {
            let read_lock = self.config.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default configuration: {}", e);
            LanternConfig::default()
        });

        {
            let mut write_lock = self.config.write().unwrap();
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap();
        *write_lock = None;
    }

    fn load_config(&self) -> Result<LanternConfig, String> {
        let file = AtomicTomlFile::<LanternConfig>::new(self.path.clone());

        match file.load().map_err(|e| e.to_string())? {
            Some(config) => Ok(config),
            None => {
                let default_config = LanternConfig::default();
                file.save(&default_config).map_err(|e| e.to_string())?;
                tracing::info!("Created default configuration at {:?}", self.path);
                Ok(default_config)
            }
        }
    }
}

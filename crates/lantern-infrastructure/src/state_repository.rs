//! Application state repository implementation.
//!
//! Persists the trained-dataset registry across runs. State is cached in
//! memory and written through to a TOML file on every change, so reads
//! never touch the disk.

use crate::storage::{AtomicTomlError, AtomicTomlFile};
use lantern_core::error::{LanternError, Result};
use lantern_core::state::{AppState, StateRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// TOML-file-backed state repository.
///
/// All methods are async; disk writes run on the blocking thread pool.
#[derive(Clone)]
pub struct TomlStateRepository {
    /// Cached app state loaded from storage.
    state: Arc<Mutex<AppState>>,
    /// Backing file handle.
    file: Arc<AtomicTomlFile<AppState>>,
}

impl TomlStateRepository {
    /// Creates a repository backed by the given file and loads the
    /// initial state. A missing or empty file yields the default state.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Serialization` if an existing file cannot be read.
    pub async fn new(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::<AppState>::new(path));

        let loader = file.clone();
        let initial_state = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| LanternError::internal(format!("state load task failed: {}", e)))?
            .map_err(map_storage_error)?
            .unwrap_or_default();

        Ok(Self {
            state: Arc::new(Mutex::new(initial_state)),
            file,
        })
    }

    /// Creates a repository at the standard platform location
    /// (`~/.config/lantern/app_state.toml`).
    pub async fn with_default_path() -> Result<Self> {
        let path = crate::paths::LanternPaths::state_file()
            .map_err(|e| LanternError::config(e.to_string()))?;
        Self::new(path).await
    }
}

#[async_trait::async_trait]
impl StateRepository for TomlStateRepository {
    async fn get_state(&self) -> Result<AppState> {
        Ok(self.state.lock().await.clone())
    }

    async fn trained_datasets(&self) -> Vec<String> {
        self.state.lock().await.trained_datasets.clone()
    }

    async fn record_trained_dataset(&self, name: String) -> Result<bool> {
        // Cheap duplicate check against the cache before touching disk
        {
            let state = self.state.lock().await;
            if state.trained_datasets.contains(&name) {
                return Ok(false);
            }
        }

        let file = self.file.clone();
        let dataset = name.clone();
        let (updated_state, added) = tokio::task::spawn_blocking(move || {
            let mut added = false;
            let updated = file.update(AppState::default(), |state| {
                added = state.record_trained_dataset(dataset);
                Ok(())
            })?;
            Ok::<_, AtomicTomlError>((updated, added))
        })
        .await
        .map_err(|e| LanternError::internal(format!("state update task failed: {}", e)))?
        .map_err(map_storage_error)?;

        *self.state.lock().await = updated_state;

        if added {
            tracing::debug!("Recorded trained dataset '{}'", name);
        }
        Ok(added)
    }
}

fn map_storage_error(err: AtomicTomlError) -> LanternError {
    match err {
        AtomicTomlError::Io(e) => LanternError::io(e.to_string()),
        AtomicTomlError::Parse(e) => LanternError::serialization("TOML", e.to_string()),
        AtomicTomlError::Serialize(e) => LanternError::serialization("TOML", e.to_string()),
    }
}

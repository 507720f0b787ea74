//! Dataset training use case implementation.
//!
//! `TrainingService` wraps the dataset lifecycle on the assistant backend:
//! uploading source files, triggering training, and listing what is
//! available locally (the persisted registry) and remotely.

use std::sync::Arc;

use lantern_core::error::{LanternError, Result};
use lantern_core::state::StateRepository;
use lantern_interaction::{AssistantBackend, LlmProvider, RetrievalHit, UploadFile};
use tracing::{info, warn};

/// Use case for dataset upload, training, and discovery.
pub struct TrainingService {
    /// Remote collaborator running uploads and training.
    backend: Arc<dyn AssistantBackend>,
    /// Registry of datasets this machine has trained.
    state: Arc<dyn StateRepository>,
}

impl TrainingService {
    /// Creates a new `TrainingService`.
    pub fn new(backend: Arc<dyn AssistantBackend>, state: Arc<dyn StateRepository>) -> Self {
        Self { backend, state }
    }

    /// Uploads files into a named dataset on the backend.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank dataset name or an empty file
    /// list, `RemoteFailure` when the upload fails.
    ///
    /// # Returns
    ///
    /// The server confirmation message.
    pub async fn upload(&self, dataset: &str, files: Vec<UploadFile>) -> Result<String> {
        let dataset = dataset.trim();
        if dataset.is_empty() {
            return Err(LanternError::invalid_input("dataset name must not be blank"));
        }
        if files.is_empty() {
            return Err(LanternError::invalid_input("no files to upload"));
        }

        info!(
            "[TrainingService] Uploading {} file(s) to dataset '{}'",
            files.len(),
            dataset
        );
        self.backend.upload_dataset(dataset, files).await
    }

    /// Trains a previously uploaded dataset.
    ///
    /// On success the name is appended to the persisted registry
    /// (deduplicated). A registry write failure is logged but does not fail
    /// the call: the backend has already trained the dataset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank dataset name, `RemoteFailure`
    /// when training fails (a missing dataset surfaces as the server's
    /// 404 detail).
    ///
    /// # Returns
    ///
    /// The server confirmation message.
    pub async fn train(&self, dataset: &str) -> Result<String> {
        let dataset = dataset.trim();
        if dataset.is_empty() {
            return Err(LanternError::invalid_input("dataset name must not be blank"));
        }

        let message = self.backend.train_dataset(dataset).await?;
        info!("[TrainingService] Trained dataset '{}'", dataset);

        match self.state.record_trained_dataset(dataset.to_string()).await {
            Ok(true) => {}
            Ok(false) => info!("[TrainingService] Dataset '{}' was already recorded", dataset),
            Err(e) => warn!(
                "[TrainingService] Failed to record trained dataset '{}': {}",
                dataset, e
            ),
        }

        Ok(message)
    }

    /// Dataset names this machine has trained, in first-trained order.
    pub async fn local_datasets(&self) -> Vec<String> {
        self.state.trained_datasets().await
    }

    /// Dataset names the backend holds.
    ///
    /// # Errors
    ///
    /// Returns `RemoteFailure` when the listing call fails.
    pub async fn remote_datasets(&self) -> Result<Vec<String>> {
        self.backend.list_datasets().await
    }

    /// Model names available for the provider.
    ///
    /// # Errors
    ///
    /// Returns `RemoteFailure` when the listing call fails.
    pub async fn models(&self, provider: LlmProvider) -> Result<Vec<String>> {
        self.backend.list_models(provider).await
    }

    /// Raw retrieval search against a dataset, for inspecting what context
    /// a chat call would pull in.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank query, `RemoteFailure` when the
    /// search fails.
    pub async fn query(&self, dataset: &str, query: &str, top_k: u32) -> Result<Vec<RetrievalHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LanternError::invalid_input("query must not be blank"));
        }
        self.backend.query_dataset(dataset, query, top_k).await
    }
}

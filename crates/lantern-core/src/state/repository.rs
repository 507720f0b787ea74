//! State repository trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::model::AppState;

/// Repository for managing persisted application state.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Returns the current application state.
    async fn get_state(&self) -> Result<AppState>;

    /// Returns the trained dataset registry, in first-trained order.
    async fn trained_datasets(&self) -> Vec<String>;

    /// Records a trained dataset name, persisting the updated registry.
    ///
    /// # Returns
    ///
    /// `true` if the name was new and appended, `false` if already present
    /// (in which case nothing is written).
    async fn record_trained_dataset(&self, name: String) -> Result<bool>;
}

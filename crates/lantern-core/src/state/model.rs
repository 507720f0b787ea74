//! Application state model.
//!
//! This module contains the small piece of state that outlives the process:
//! the registry of dataset names that have been trained on the backend.

use serde::{Deserialize, Serialize};

/// Application-level state persisted across runs.
///
/// The registry is append-only and name-deduplicated, so concurrent-run
/// conflict resolution is unnecessary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Names of datasets that completed training, in first-trained order.
    #[serde(default)]
    pub trained_datasets: Vec<String>,
}

impl AppState {
    /// Records a trained dataset name, keeping the registry deduplicated.
    ///
    /// # Returns
    ///
    /// `true` if the name was new and appended, `false` if already present.
    pub fn record_trained_dataset(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.trained_datasets.contains(&name) {
            return false;
        }
        self.trained_datasets.push(name);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty() {
        let state = AppState::default();
        assert!(state.trained_datasets.is_empty());
    }

    #[test]
    fn test_record_trained_dataset_appends_in_order() {
        let mut state = AppState::default();
        assert!(state.record_trained_dataset("alpha"));
        assert!(state.record_trained_dataset("beta"));
        assert_eq!(state.trained_datasets, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_record_trained_dataset_deduplicates() {
        let mut state = AppState::default();
        assert!(state.record_trained_dataset("alpha"));
        assert!(!state.record_trained_dataset("alpha"));
        assert_eq!(state.trained_datasets, vec!["alpha"]);
    }

    #[test]
    fn test_deserialize_missing_field_defaults() {
        let state: AppState = toml::from_str("").unwrap();
        assert!(state.trained_datasets.is_empty());
    }
}

//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every field has a
//! default so a missing or partial file still yields a usable configuration.

use serde::{Deserialize, Serialize};

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanternConfig {
    /// Base URL of the assistant backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Timeout applied to every remote call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Provider tag sent with chat and summarize calls.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model name sent with chat calls.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Number of retrieval hits requested per chat call.
    #[serde(default = "default_top_k")]
    pub default_top_k: u32,
    /// Dataset queried by default; empty until the user picks one.
    #[serde(default)]
    pub default_dataset: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_top_k() -> u32 {
    5
}

impl Default for LanternConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_top_k: default_top_k(),
            default_dataset: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: LanternConfig = toml::from_str("").unwrap();
        assert_eq!(config, LanternConfig::default());
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.default_top_k, 5);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config: LanternConfig =
            toml::from_str("backend_url = \"http://10.0.0.5:9000\"").unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.5:9000");
        assert_eq!(config.default_model, "gpt-3.5-turbo");
        assert_eq!(config.request_timeout_secs, 30);
    }
}

//! Export use case implementation.
//!
//! `ExportService` owns the clipboard workflow around the
//! `ClipboardAggregator`: selection and merge passthroughs, rendering the
//! collection into a download artifact, and delegating summarization to the
//! assistant backend.

use std::sync::Arc;

use lantern_core::clipboard::{ClipboardAggregator, ClipboardItem};
use lantern_core::error::{LanternError, Result};
use lantern_core::export::{self, ExportArtifact, ExportFormat};
use lantern_interaction::{AssistantBackend, ChatOptions};
use tokio::sync::RwLock;
use tracing::{error, info};

/// Use case for the clipboard and its export handoff.
pub struct ExportService {
    /// Snippets harvested from assistant replies, shared with the chat flow.
    clipboard: Arc<RwLock<ClipboardAggregator>>,
    /// Remote collaborator for summarization.
    backend: Arc<dyn AssistantBackend>,
    /// Per-call query options, shared with the chat flow.
    options: Arc<RwLock<ChatOptions>>,
}

impl ExportService {
    /// Creates a new `ExportService`.
    ///
    /// # Arguments
    ///
    /// * `backend` - Remote collaborator for summarize calls
    /// * `options` - Shared chat options (provider tag is reused here)
    /// * `clipboard` - Shared clipboard the service operates on
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        options: Arc<RwLock<ChatOptions>>,
        clipboard: Arc<RwLock<ClipboardAggregator>>,
    ) -> Self {
        Self {
            clipboard,
            backend,
            options,
        }
    }

    // ===== Clipboard operations =====

    /// Appends a snippet at the end of the clipboard, unselected.
    pub async fn add_item(&self, content: impl Into<String>) {
        self.clipboard.write().await.add_item(content);
    }

    /// Removes the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the index is out of range.
    pub async fn delete_item(&self, index: usize) -> Result<()> {
        self.clipboard.write().await.delete_item(index)
    }

    /// Flips the selection flag of the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the index is out of range.
    pub async fn toggle_select(&self, index: usize) -> Result<()> {
        self.clipboard.write().await.toggle_select(index)
    }

    /// Merges every item into one. No-op with fewer than two items.
    pub async fn merge_all(&self) {
        self.clipboard.write().await.merge_all();
    }

    /// Merges the selected items into one at the earliest selected
    /// position. No-op with fewer than two selected.
    pub async fn merge_selected(&self) {
        self.clipboard.write().await.merge_selected();
    }

    /// Snapshot of the clipboard items.
    pub async fn items(&self) -> Vec<ClipboardItem> {
        self.clipboard.read().await.items().to_vec()
    }

    // ===== Export handoff =====

    /// Renders the clipboard into a download artifact.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if rendering fails; an empty clipboard
    /// renders an empty artifact rather than erroring.
    pub async fn export(&self, format: ExportFormat) -> Result<ExportArtifact> {
        let contents = self.clipboard.read().await.contents();
        let artifact = export::export_as_structured(&contents, format)?;
        info!(
            "[ExportService] Rendered {} items as {} ({} bytes)",
            contents.len(),
            format,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    /// Summarizes the joined clipboard text via the assistant backend.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the clipboard is empty and
    /// `RemoteFailure` when the backend call fails.
    pub async fn summarize_clipboard(&self) -> Result<String> {
        let text = {
            let clipboard = self.clipboard.read().await;
            if clipboard.is_empty() {
                return Err(LanternError::invalid_input(
                    "clipboard is empty; nothing to summarize",
                ));
            }
            export::export_as_text(&clipboard.contents())
        };

        let provider = self.options.read().await.provider;
        info!(
            "[ExportService] Summarizing {} chars via '{}'",
            text.len(),
            provider
        );

        self.backend.summarize(provider, &text).await.map_err(|e| {
            error!("[ExportService] Summarize call failed: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lantern_core::session::ConversationMessage;
    use lantern_interaction::{LlmProvider, RetrievalHit, UploadFile};

    struct MockBackend {
        summary: Result<String>,
        summarize_calls: std::sync::Mutex<Vec<(LlmProvider, String)>>,
    }

    impl MockBackend {
        fn with_summary(summary: Result<String>) -> Self {
            Self {
                summary,
                summarize_calls: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AssistantBackend for MockBackend {
        async fn chat(
            &self,
            _options: &ChatOptions,
            _query: &str,
            _history: &[ConversationMessage],
        ) -> Result<String> {
            unimplemented!("not used by ExportService tests")
        }

        async fn summarize(&self, provider: LlmProvider, content: &str) -> Result<String> {
            self.summarize_calls
                .lock()
                .unwrap()
                .push((provider, content.to_string()));
            self.summary.clone()
        }

        async fn upload_dataset(&self, _dataset: &str, _files: Vec<UploadFile>) -> Result<String> {
            unimplemented!("not used by ExportService tests")
        }

        async fn train_dataset(&self, _dataset: &str) -> Result<String> {
            unimplemented!("not used by ExportService tests")
        }

        async fn list_datasets(&self) -> Result<Vec<String>> {
            unimplemented!("not used by ExportService tests")
        }

        async fn list_models(&self, _provider: LlmProvider) -> Result<Vec<String>> {
            unimplemented!("not used by ExportService tests")
        }

        async fn query_dataset(
            &self,
            _dataset: &str,
            _query: &str,
            _top_k: u32,
        ) -> Result<Vec<RetrievalHit>> {
            unimplemented!("not used by ExportService tests")
        }
    }

    fn service_with(backend: Arc<MockBackend>) -> ExportService {
        let options = ChatOptions {
            dataset: "manuals".to_string(),
            provider: LlmProvider::Gemini,
            model: String::new(),
            top_k: 5,
        };
        ExportService::new(
            backend,
            Arc::new(RwLock::new(options)),
            Arc::new(RwLock::new(ClipboardAggregator::new())),
        )
    }

    #[tokio::test]
    async fn test_export_json_parses_back_to_items() {
        let backend = Arc::new(MockBackend::with_summary(Ok(String::new())));
        let service = service_with(backend);
        service.add_item("first").await;
        service.add_item("second").await;

        let artifact = service.export(ExportFormat::Json).await.unwrap();
        assert_eq!(artifact.file_name, "clipboard_export.json");

        let parsed: Vec<String> = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_export_empty_clipboard_yields_empty_artifact() {
        let backend = Arc::new(MockBackend::with_summary(Ok(String::new())));
        let service = service_with(backend);

        let artifact = service.export(ExportFormat::Txt).await.unwrap();
        assert!(artifact.bytes.is_empty());
    }

    #[tokio::test]
    async fn test_merge_selected_through_service() {
        let backend = Arc::new(MockBackend::with_summary(Ok(String::new())));
        let service = service_with(backend);
        service.add_item("x").await;
        service.add_item("y").await;
        service.add_item("z").await;
        service.toggle_select(0).await.unwrap();
        service.toggle_select(2).await.unwrap();

        service.merge_selected().await;

        let contents: Vec<String> = service
            .items()
            .await
            .into_iter()
            .map(|i| i.content)
            .collect();
        assert_eq!(contents, vec!["x\n\nz", "y"]);
    }

    #[tokio::test]
    async fn test_summarize_joins_clipboard_and_delegates() {
        let backend = Arc::new(MockBackend::with_summary(Ok("a summary".to_string())));
        let service = service_with(backend.clone());
        service.add_item("alpha").await;
        service.add_item("beta").await;

        let summary = service.summarize_clipboard().await.unwrap();
        assert_eq!(summary, "a summary");

        let calls = backend.summarize_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, LlmProvider::Gemini);
        assert_eq!(calls[0].1, "alpha\n\nbeta");
    }

    #[tokio::test]
    async fn test_summarize_empty_clipboard_rejected() {
        let backend = Arc::new(MockBackend::with_summary(Ok(String::new())));
        let service = service_with(backend.clone());

        let err = service.summarize_clipboard().await.unwrap_err();
        assert!(err.is_invalid_input());
        assert!(backend.summarize_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_surfaces_remote_failure() {
        let backend = Arc::new(MockBackend::with_summary(Err(LanternError::remote(
            "backend returned 500",
        ))));
        let service = service_with(backend);
        service.add_item("alpha").await;

        let err = service.summarize_clipboard().await.unwrap_err();
        assert!(err.is_remote_failure());
    }
}

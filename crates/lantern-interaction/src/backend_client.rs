//! BackendClient - HTTP client for the assistant backend.
//!
//! The backend takes form-encoded requests and answers JSON. Successful
//! bodies carry `result`, `message`, `datasets`, or `models` depending on
//! the endpoint; HTTP-level failures carry `detail`. Every call runs under
//! the configured timeout and any transport or status failure maps to
//! `RemoteFailure`.

use std::time::Duration;

use async_trait::async_trait;
use lantern_core::config::LanternConfig;
use lantern_core::error::{LanternError, Result};
use lantern_core::session::ConversationMessage;
use reqwest::multipart;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::provider::LlmProvider;

/// Chat-model names offered when the backend has no listing endpoint for
/// the provider.
const OPENAI_CHAT_MODELS: [&str; 2] = ["gpt-3.5-turbo", "gpt-4"];

/// Options governing a chat retrieval call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    /// Dataset queried for context.
    pub dataset: String,
    /// Provider routing tag.
    pub provider: LlmProvider,
    /// Model name handed to the provider.
    pub model: String,
    /// Number of retrieval hits mixed into the prompt.
    pub top_k: u32,
}

impl ChatOptions {
    /// Builds the initial options from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configured provider tag is unknown.
    pub fn from_config(config: &LanternConfig) -> Result<Self> {
        Ok(Self {
            dataset: config.default_dataset.clone(),
            provider: config.default_provider.parse()?,
            model: config.default_model.clone(),
            top_k: config.default_top_k,
        })
    }
}

/// A scored retrieval hit from the query endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetrievalHit {
    pub score: f64,
    pub text: String,
}

/// A file handed to the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The remote collaborator contract the application layer depends on.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Retrieval-augmented chat: answers `query` against the options'
    /// dataset, with `history` as conversational context.
    async fn chat(
        &self,
        options: &ChatOptions,
        query: &str,
        history: &[ConversationMessage],
    ) -> Result<String>;

    /// Summarizes `content` with the given provider.
    async fn summarize(&self, provider: LlmProvider, content: &str) -> Result<String>;

    /// Uploads files into a named dataset. Returns the server confirmation.
    async fn upload_dataset(&self, dataset: &str, files: Vec<UploadFile>) -> Result<String>;

    /// Trains (embeds and stores) a previously uploaded dataset.
    async fn train_dataset(&self, dataset: &str) -> Result<String>;

    /// Names of the datasets the server holds.
    async fn list_datasets(&self) -> Result<Vec<String>>;

    /// Model names available for the provider.
    async fn list_models(&self, provider: LlmProvider) -> Result<Vec<String>>;

    /// Raw retrieval search against a dataset, without LLM involvement.
    async fn query_dataset(
        &self,
        dataset: &str,
        query: &str,
        top_k: u32,
    ) -> Result<Vec<RetrievalHit>>;
}

/// Talks to the assistant backend over HTTP.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client for the given base URL with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LanternError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from configuration.
    pub fn from_config(config: &LanternConfig) -> Result<Self> {
        Self::new(
            &config.backend_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Unwraps a response, turning non-success statuses into RemoteFailure
    /// with the server's `detail` when one is present.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("[BackendClient] Backend returned {}: {}", status, body);
        Err(map_http_error(status, body))
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| LanternError::remote(format!("failed to parse backend response: {}", e)))
    }
}

#[async_trait]
impl AssistantBackend for BackendClient {
    async fn chat(
        &self,
        options: &ChatOptions,
        query: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        let form = [
            ("dataset_name", options.dataset.clone()),
            ("query", query.to_string()),
            ("llm", options.provider.tag().to_string()),
            ("model", options.model.clone()),
            ("top_k", options.top_k.to_string()),
            ("history", history_payload(history)?),
        ];
        debug!(
            "[BackendClient] POST /chat_llm dataset={} llm={} model={} history_len={}",
            options.dataset,
            options.provider,
            options.model,
            history.len()
        );

        let response = self
            .client
            .post(self.endpoint("/chat_llm"))
            .form(&form)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = Self::check_status(response).await?;

        let parsed: ResultResponse = Self::parse_json(response).await?;
        Ok(parsed.result)
    }

    async fn summarize(&self, provider: LlmProvider, content: &str) -> Result<String> {
        let form = [
            ("content", content.to_string()),
            ("llm", provider.tag().to_string()),
        ];
        debug!("[BackendClient] POST /summarize_content llm={}", provider);

        let response = self
            .client
            .post(self.endpoint("/summarize_content"))
            .form(&form)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = Self::check_status(response).await?;

        let parsed: ResultResponse = Self::parse_json(response).await?;
        Ok(parsed.result)
    }

    async fn upload_dataset(&self, dataset: &str, files: Vec<UploadFile>) -> Result<String> {
        let mut form = multipart::Form::new().text("dataset_name", dataset.to_string());
        for file in files {
            let part = multipart::Part::bytes(file.bytes).file_name(file.file_name);
            form = form.part("files", part);
        }
        debug!("[BackendClient] POST /upload_dataset dataset={}", dataset);

        let response = self
            .client
            .post(self.endpoint("/upload_dataset"))
            .multipart(form)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = Self::check_status(response).await?;

        let parsed: MessageResponse = Self::parse_json(response).await?;
        Ok(parsed.message)
    }

    async fn train_dataset(&self, dataset: &str) -> Result<String> {
        let form = [("dataset_name", dataset.to_string())];
        debug!("[BackendClient] POST /train_dataset dataset={}", dataset);

        let response = self
            .client
            .post(self.endpoint("/train_dataset"))
            .form(&form)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = Self::check_status(response).await?;

        let parsed: MessageResponse = Self::parse_json(response).await?;
        Ok(parsed.message)
    }

    async fn list_datasets(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.endpoint("/list_datasets"))
            .send()
            .await
            .map_err(map_request_error)?;
        let response = Self::check_status(response).await?;

        let parsed: DatasetsResponse = Self::parse_json(response).await?;
        Ok(parsed.datasets)
    }

    async fn list_models(&self, provider: LlmProvider) -> Result<Vec<String>> {
        let path = match provider {
            LlmProvider::Groq => "/list_groq_models",
            LlmProvider::Gemini => "/list_gemini_models",
            // The backend has no listing endpoint for this provider
            LlmProvider::OpenAi => {
                return Ok(OPENAI_CHAT_MODELS.iter().map(|m| m.to_string()).collect());
            }
        };

        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(map_request_error)?;
        let response = Self::check_status(response).await?;

        let parsed: ModelsResponse = Self::parse_json(response).await?;
        Ok(parsed.models)
    }

    async fn query_dataset(
        &self,
        dataset: &str,
        query: &str,
        top_k: u32,
    ) -> Result<Vec<RetrievalHit>> {
        // top_k rides in the query string, not the form body
        let form = [
            ("dataset_name", dataset.to_string()),
            ("query", query.to_string()),
        ];
        debug!(
            "[BackendClient] POST /query dataset={} top_k={}",
            dataset, top_k
        );

        let response = self
            .client
            .post(self.endpoint("/query"))
            .query(&[("top_k", top_k.to_string())])
            .form(&form)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = Self::check_status(response).await?;

        let parsed: QueryResponse = Self::parse_json(response).await?;
        Ok(parsed.results)
    }
}

/// Serializes history as the backend expects: a JSON array of role/content
/// pairs, timestamps stripped.
fn history_payload(history: &[ConversationMessage]) -> Result<String> {
    let entries: Vec<HistoryEntry<'_>> = history
        .iter()
        .map(|message| HistoryEntry {
            role: message.role.to_string(),
            content: &message.content,
        })
        .collect();
    Ok(serde_json::to_string(&entries)?)
}

fn map_request_error(err: reqwest::Error) -> LanternError {
    if err.is_timeout() {
        return LanternError::remote("backend request timed out");
    }
    if err.is_connect() {
        return LanternError::remote(format!("could not connect to backend: {}", err));
    }
    LanternError::remote(format!("backend request failed: {}", err))
}

fn map_http_error(status: StatusCode, body: String) -> LanternError {
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body);

    if detail.is_empty() {
        LanternError::remote(format!("backend returned {}", status))
    } else {
        LanternError::remote_with_detail(format!("backend returned {}", status), detail)
    }
}

#[derive(Serialize)]
struct HistoryEntry<'a> {
    role: String,
    content: &'a str,
}

#[derive(Deserialize)]
struct ResultResponse {
    result: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct DatasetsResponse {
    datasets: Vec<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    models: Vec<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<RetrievalHit>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

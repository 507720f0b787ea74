pub mod backend_client;
pub mod provider;

pub use crate::backend_client::{
    AssistantBackend, BackendClient, ChatOptions, RetrievalHit, UploadFile,
};
pub use crate::provider::LlmProvider;

//! Client modules for external API interactions
//!
//! Each remote service sits behind a small trait so the pipeline can be
//! driven by in-process stubs.

use async_trait::async_trait;

use crate::ai::prompt_builder::CompletionParams;
use crate::core::config::RepoLocation;
use crate::core::models::{OperationId, ReadOperation, RepoEntry};
use crate::errors::PipelineError;

pub mod llm_client;
pub mod repo_client;
pub mod vision_client;

pub use llm_client::LlmClient;
pub use repo_client::GithubClient;
pub use vision_client::VisionClient;

/// Remote OCR service that runs recognition as a background job.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Starts a recognition job for the given image bytes.
    async fn submit(&self, image: Vec<u8>) -> Result<OperationId, PipelineError>;

    /// Queries the current state of a previously submitted job.
    async fn poll(&self, id: &OperationId) -> Result<ReadOperation, PipelineError>;
}

/// Remote language model returning the first completion choice.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, PipelineError>;
}

/// Read-only access to files in a source repository.
#[async_trait]
pub trait RepositoryContents: Send + Sync {
    async fn list_directory(&self, location: &RepoLocation) -> Result<Vec<RepoEntry>, PipelineError>;

    /// Returns the decoded text of the file at `path`.
    async fn get_raw_content(
        &self,
        location: &RepoLocation,
        path: &str,
    ) -> Result<String, PipelineError>;
}

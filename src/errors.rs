use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to read input file: {0}")]
    IoError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to access vision API: {0}")]
    VisionError(String),

    #[error("Text recognition job failed: {0}")]
    OcrFailed(String),

    #[error("Text recognition job still pending after {0} status queries")]
    PollExhausted(usize),

    #[error("Text recognition job did not finish within {0:?}")]
    PollTimeout(Duration),

    #[error("Failed to access completion API: {0}")]
    CompletionError(String),

    #[error("Failed to access repository API: {0}")]
    RepositoryError(String),

    #[error("Failed to parse response payload: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for PipelineError {
    fn from(error: reqwest::Error) -> Self {
        PipelineError::HttpError(error.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        PipelineError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(error: serde_json::Error) -> Self {
        PipelineError::ParseError(error.to_string())
    }
}

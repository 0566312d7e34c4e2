//! LLM (Azure `OpenAI`) API client module
//!
//! Encapsulates the completions endpoint of a deployed model.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use super::CompletionProvider;
use crate::ai::prompt_builder::CompletionParams;
use crate::errors::PipelineError;

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

/// LLM API client for prompt completions
pub struct LlmClient {
    http: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        api_key: String,
        deployment: String,
        api_version: String,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            PipelineError::HttpError(format!("Failed to build OpenAI HTTP client: {e}"))
        })?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment,
            api_version,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/completions?api-version={}",
            self.endpoint,
            urlencoding::encode(&self.deployment),
            urlencoding::encode(&self.api_version)
        )
    }
}

/// Request body for the completions endpoint; `top_p` is omitted when unset.
#[must_use]
pub fn build_request_body(prompt: &str, params: &CompletionParams) -> Value {
    let mut body = json!({
        "prompt": prompt,
        "max_tokens": params.max_tokens,
        "temperature": params.temperature,
    });
    if let Some(top_p) = params.top_p {
        body["top_p"] = json!(top_p);
    }
    body
}

/// Pulls the first choice's text out of a completions payload.
///
/// # Errors
///
/// Returns an error if the payload does not parse or carries no choices.
pub fn first_choice_text(payload: Value) -> Result<String, PipelineError> {
    let response: CompletionResponse = serde_json::from_value(payload).map_err(|e| {
        PipelineError::CompletionError(format!("Failed to parse OpenAI response: {e}"))
    })?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or_else(|| PipelineError::CompletionError("No choices in response".to_string()))
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, PipelineError> {
        info!(
            "Requesting completion from deployment {} (max_tokens={}, temperature={})",
            self.deployment, params.max_tokens, params.temperature
        );
        debug!("Input: {}", prompt);

        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&build_request_body(prompt, params))
            .send()
            .await
            .map_err(|e| PipelineError::HttpError(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(PipelineError::CompletionError(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            PipelineError::CompletionError(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let completion = first_choice_text(response_json)?;
        debug!("Chatbot: {}", completion);
        Ok(completion)
    }
}

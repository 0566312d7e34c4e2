//! Computer Vision "Read" API client
//!
//! Submits an image for asynchronous text recognition and fetches job status.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, info};

use super::TextRecognizer;
use crate::core::models::{OperationId, ReadOperation};
use crate::errors::PipelineError;

const READ_API_PATH: &str = "vision/v3.2/read";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

pub struct VisionClient {
    http: Client,
    endpoint: String,
}

impl VisionClient {
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, PipelineError> {
        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(api_key).map_err(|e| {
            PipelineError::ConfigError(format!("Invalid vision API key header: {e}"))
        })?;
        key_value.set_sensitive(true);
        headers.insert(SUBSCRIPTION_KEY_HEADER, key_value);

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| PipelineError::HttpError(format!("Failed to build vision HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn analyze_url(&self) -> String {
        format!("{}/{READ_API_PATH}/analyze", self.endpoint)
    }

    fn results_url(&self, id: &OperationId) -> String {
        format!("{}/{READ_API_PATH}/analyzeResults/{id}", self.endpoint)
    }
}

#[async_trait]
impl TextRecognizer for VisionClient {
    async fn submit(&self, image: Vec<u8>) -> Result<OperationId, PipelineError> {
        info!("Submitting {} bytes for text recognition", image.len());

        let response = self
            .http
            .post(self.analyze_url())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| PipelineError::HttpError(format!("Vision submit request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(PipelineError::VisionError(format!(
                "Read submission rejected (status {status}): {error_text}"
            )));
        }

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                PipelineError::VisionError("Response is missing Operation-Location".to_string())
            })?;

        let id = OperationId::from_operation_location(location)?;
        debug!("Text recognition job {} created", id);
        Ok(id)
    }

    async fn poll(&self, id: &OperationId) -> Result<ReadOperation, PipelineError> {
        let response = self
            .http
            .get(self.results_url(id))
            .send()
            .await
            .map_err(|e| PipelineError::HttpError(format!("Vision status request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(PipelineError::VisionError(format!(
                "Status query for job {id} failed (status {status}): {error_text}"
            )));
        }

        let operation: ReadOperation = response.json().await.map_err(|e| {
            PipelineError::ParseError(format!("Failed to parse read result for job {id}: {e}"))
        })?;
        debug!("Job {} status: {:?}", id, operation.status);
        Ok(operation)
    }
}

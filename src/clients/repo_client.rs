//! GitHub contents API client
//!
//! Lists a directory of baseline documents and fetches individual files.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::RepositoryContents;
use crate::core::config::RepoLocation;
use crate::core::models::RepoEntry;
use crate::errors::PipelineError;

const API_BASE: &str = "https://api.github.com";
const WEB_BASE: &str = "https://github.com";

#[derive(Debug, Deserialize)]
struct FileContent {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Encodes each `/`-separated segment, keeping the separators.
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Browsable link to a file in the repository.
#[must_use]
pub fn blob_url(location: &RepoLocation, path: &str) -> String {
    format!(
        "{WEB_BASE}/{}/{}/blob/{}/{}",
        location.owner,
        location.repo,
        location.git_ref,
        encode_path(path)
    )
}

/// Decodes a base64 `content` field, which GitHub wraps at 60 columns.
///
/// # Errors
///
/// Returns an error for invalid base64 or non UTF-8 content.
pub fn decode_content(encoded: &str) -> Result<String, PipelineError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| PipelineError::RepositoryError(format!("Invalid base64 content: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| PipelineError::RepositoryError(format!("Content is not UTF-8: {e}")))
}

pub struct GithubClient {
    http: Client,
    username: String,
    token: String,
}

impl GithubClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(username: String, token: String, timeout: Duration) -> Result<Self, PipelineError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("threatmodel/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| PipelineError::HttpError(format!("Failed to build GitHub HTTP client: {e}")))?;

        Ok(Self {
            http,
            username,
            token,
        })
    }

    fn contents_url(location: &RepoLocation, path: &str) -> String {
        format!(
            "{API_BASE}/repos/{}/{}/contents/{}?ref={}",
            location.owner,
            location.repo,
            encode_path(path),
            urlencoding::encode(&location.git_ref)
        )
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, PipelineError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.token))
            .send()
            .await
            .map_err(|e| PipelineError::HttpError(format!("GitHub API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(PipelineError::RepositoryError(format!(
                "GitHub API error (status {status}): {error_text}"
            )));
        }

        response.json().await.map_err(|e| {
            PipelineError::RepositoryError(format!("Failed to parse GitHub response: {e}"))
        })
    }
}

#[async_trait]
impl RepositoryContents for GithubClient {
    async fn list_directory(&self, location: &RepoLocation) -> Result<Vec<RepoEntry>, PipelineError> {
        let url = Self::contents_url(location, &location.path);
        self.get_json(&url).await
    }

    async fn get_raw_content(
        &self,
        location: &RepoLocation,
        path: &str,
    ) -> Result<String, PipelineError> {
        let url = Self::contents_url(location, path);
        let file: FileContent = self.get_json(&url).await?;

        match file.encoding.as_deref() {
            Some("base64") | None => decode_content(&file.content),
            Some(other) => Err(PipelineError::RepositoryError(format!(
                "Unsupported content encoding `{other}` for {path}"
            ))),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::PipelineError;

/// Length of the trailing operation id in an `Operation-Location` header.
pub const OPERATION_ID_LEN: usize = 36;

/// Handle of a text recognition job on the vision service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationId(String);

impl OperationId {
    /// Extracts the id from the tail of an `Operation-Location` header value.
    pub fn from_operation_location(location: &str) -> Result<Self, PipelineError> {
        let location = location.trim();
        let start = location
            .len()
            .checked_sub(OPERATION_ID_LEN)
            .filter(|start| location.is_char_boundary(*start))
            .ok_or_else(|| {
                PipelineError::VisionError(format!("Operation-Location too short: {location}"))
            })?;

        let id = uuid::Uuid::parse_str(&location[start..]).map_err(|e| {
            PipelineError::VisionError(format!("Invalid operation id in {location}: {e}"))
        })?;

        Ok(Self(id.hyphenated().to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl OperationStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Succeeded | OperationStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub read_results: Vec<ReadResult>,
}

/// Status payload returned for a text recognition job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOperation {
    pub status: OperationStatus,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
}

impl ReadOperation {
    #[must_use]
    pub fn pending(status: OperationStatus) -> Self {
        Self {
            status,
            analyze_result: None,
        }
    }

    #[must_use]
    pub fn succeeded(pages: Vec<Vec<&str>>) -> Self {
        let read_results = pages
            .into_iter()
            .enumerate()
            .map(|(i, lines)| ReadResult {
                page: u32::try_from(i + 1).ok(),
                lines: lines
                    .into_iter()
                    .map(|text| Line {
                        text: text.to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            status: OperationStatus::Succeeded,
            analyze_result: Some(AnalyzeResult { read_results }),
        }
    }
}

/// Text recovered from an image, one entry per recognized line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub lines: Vec<String>,
}

impl ExtractedDocument {
    /// Flattens every page's lines in service order.
    #[must_use]
    pub fn from_analyze_result(result: &AnalyzeResult) -> Self {
        let lines = result
            .read_results
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.text.clone()))
            .collect();
        Self { lines }
    }

    /// Each line followed by a newline.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One item of a repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl RepoEntry {
    /// Entries without a type are treated as files.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind.as_deref().is_none_or(|kind| kind == "file")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineOutcome {
    /// `body` is either a link to the file or its decoded text.
    Found { file_name: String, body: String },
    NotFound,
    Failed(String),
}

impl BaselineOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, BaselineOutcome::Found { .. })
    }
}

impl fmt::Display for BaselineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaselineOutcome::Found { body, .. } => f.write_str(body),
            BaselineOutcome::NotFound => f.write_str("not found"),
            BaselineOutcome::Failed(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Lookup outcomes keyed by requested service, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineResult {
    pub entries: Vec<(String, BaselineOutcome)>,
}

impl BaselineResult {
    #[must_use]
    pub fn get(&self, service: &str) -> Option<&BaselineOutcome> {
        self.entries
            .iter()
            .find(|(name, _)| name == service)
            .map(|(_, outcome)| outcome)
    }

    #[must_use]
    pub fn found_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_found()).count()
    }
}

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::ai::PromptTemplate;
use crate::errors::PipelineError;

pub const DEFAULT_DEPLOYMENT: &str = "text-davinci-003";
pub const DEFAULT_API_VERSION: &str = "2022-12-01";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXTRA_LOOKUPS: &str = "Azure Security Benchmark, Microsoft Cloud Security Benchmark";
pub const DEFAULT_RECOMMEND_TEMPLATES: &str = "recommendations";

/// How long to wait between status queries and when to give up.
///
/// `max_attempts` and `timeout` default to `None`, which polls until the
/// remote job reaches a terminal state. A set `max_attempts` is at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: Option<usize>,
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: None,
            timeout: None,
        }
    }
}

/// Directory in a remote repository that holds baseline documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub git_ref: String,
}

impl Default for RepoLocation {
    fn default() -> Self {
        Self {
            owner: "MicrosoftDocs".to_string(),
            repo: "SecurityBenchmarks".to_string(),
            path: "Azure Offer Security Baselines/3.0".to_string(),
            git_ref: "master".to_string(),
        }
    }
}

/// What a baseline hit resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselineMode {
    /// A browsable link to the matched file.
    #[default]
    Link,
    /// The decoded text of the matched file.
    Content,
}

impl FromStr for BaselineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "link" => Ok(BaselineMode::Link),
            "content" => Ok(BaselineMode::Content),
            other => Err(format!("expected `link` or `content`, got `{other}`")),
        }
    }
}

/// Input fed to the recommendation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecommendationSource {
    /// The comma-separated service list produced by the first completion.
    #[default]
    Services,
    /// The raw OCR text.
    Text,
}

impl FromStr for RecommendationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "services" => Ok(RecommendationSource::Services),
            "text" => Ok(RecommendationSource::Text),
            other => Err(format!("expected `services` or `text`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub vision_endpoint: String,
    pub vision_api_key: String,
    pub openai_endpoint: String,
    pub openai_api_key: String,
    pub openai_deployment: String,
    pub openai_api_version: String,
    pub image_file_path: String,
    pub github_username: String,
    pub github_token: String,
    pub baseline_repo: RepoLocation,
    pub baseline_mode: BaselineMode,
    pub extra_lookups: Vec<String>,
    pub recommend_from: RecommendationSource,
    /// Prompts run over the recommendation input, in order.
    pub recommend_templates: Vec<PromptTemplate>,
    pub poll: PollConfig,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PipelineError::ConfigError(format!("{key}: not set")))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let defaults = RepoLocation::default();
        let baseline_repo = RepoLocation {
            owner: optional("BASELINE_REPO_OWNER", &defaults.owner),
            repo: optional("BASELINE_REPO_NAME", &defaults.repo),
            path: optional("BASELINE_REPO_PATH", &defaults.path),
            git_ref: optional("BASELINE_REPO_REF", &defaults.git_ref),
        };

        let baseline_mode = parse_or_default(&lookup, "BASELINE_MODE")?;
        let recommend_from = parse_or_default(&lookup, "RECOMMEND_FROM")?;

        let extra_lookups = optional("BASELINE_EXTRA_LOOKUPS", DEFAULT_EXTRA_LOOKUPS)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let recommend_templates = parse_templates(&optional(
            "RECOMMEND_TEMPLATES",
            DEFAULT_RECOMMEND_TEMPLATES,
        ))?;

        let max_attempts = parse_number(&lookup, "OCR_MAX_POLL_ATTEMPTS")?;
        if max_attempts == Some(0) {
            return Err(PipelineError::ConfigError(
                "OCR_MAX_POLL_ATTEMPTS: must be at least 1".to_string(),
            ));
        }

        let poll = PollConfig {
            interval: Duration::from_millis(
                parse_number(&lookup, "OCR_POLL_INTERVAL_MS")?.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            max_attempts,
            timeout: parse_number(&lookup, "OCR_POLL_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        let http_timeout = Duration::from_secs(
            parse_number(&lookup, "HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        Ok(Self {
            vision_endpoint: required("COMPUTER_VISION_API_ENDPOINT")?,
            vision_api_key: required("COMPUTER_VISION_API_KEY")?,
            openai_endpoint: required("OPENAI_API_ENDPOINT")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_deployment: optional("OPENAI_DEPLOYMENT", DEFAULT_DEPLOYMENT),
            openai_api_version: optional("OPENAI_API_VERSION", DEFAULT_API_VERSION),
            image_file_path: required("IMAGE_FILEPATH")?,
            github_username: required("GITHUB_USERNAME")?,
            github_token: required("GITHUB_TOKEN")?,
            baseline_repo,
            baseline_mode,
            extra_lookups,
            recommend_from,
            recommend_templates,
            poll,
            http_timeout,
        })
    }
}

fn parse_or_default<T, F>(lookup: &F, key: &str) -> Result<T, PipelineError>
where
    T: FromStr<Err = String> + Default,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse()
            .map_err(|e| PipelineError::ConfigError(format!("{key}: {e}"))),
        _ => Ok(T::default()),
    }
}

/// Resolves a comma-separated list of template names. Blank means the default.
fn parse_templates(raw: &str) -> Result<Vec<PromptTemplate>, PipelineError> {
    let raw = if raw.trim().is_empty() {
        DEFAULT_RECOMMEND_TEMPLATES
    } else {
        raw
    };

    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            PromptTemplate::from_name(name).ok_or_else(|| {
                PipelineError::ConfigError(format!("RECOMMEND_TEMPLATES: unknown template `{name}`"))
            })
        })
        .collect()
}

fn parse_number<T, F>(lookup: &F, key: &str) -> Result<Option<T>, PipelineError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| PipelineError::ConfigError(format!("{key}: {e}"))),
        _ => Ok(None),
    }
}

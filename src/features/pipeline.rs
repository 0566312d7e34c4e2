//! Runs extraction, recommendation and baseline lookup in sequence and
//! prints each stage.

use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::baseline::resolve_service_list;
use super::extract::extract_text;
use super::recommend::{generate_recommendations, identify_services};
use crate::ai::prompt_builder::PromptTemplate;
use crate::clients::{
    CompletionProvider, GithubClient, LlmClient, RepositoryContents, TextRecognizer, VisionClient,
};
use crate::core::config::{AppConfig, BaselineMode, PollConfig, RecommendationSource, RepoLocation};
use crate::core::models::{BaselineResult, ExtractedDocument};
use crate::errors::PipelineError;

const RULE: &str = "----------------------------------------------------------";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub image_path: PathBuf,
    pub poll: PollConfig,
    pub baseline_repo: RepoLocation,
    pub baseline_mode: BaselineMode,
    pub extra_lookups: Vec<String>,
    pub recommend_from: RecommendationSource,
    pub recommend_templates: Vec<PromptTemplate>,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            image_path: PathBuf::from(&config.image_file_path),
            poll: config.poll.clone(),
            baseline_repo: config.baseline_repo.clone(),
            baseline_mode: config.baseline_mode,
            extra_lookups: config.extra_lookups.clone(),
            recommend_from: config.recommend_from,
            recommend_templates: config.recommend_templates.clone(),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub document: ExtractedDocument,
    pub services: Vec<String>,
    pub recommendations: Vec<String>,
    pub baselines: BaselineResult,
}

pub struct Pipeline<V, L, G> {
    recognizer: V,
    completions: L,
    repository: G,
    settings: PipelineSettings,
}

impl Pipeline<VisionClient, LlmClient, GithubClient> {
    /// Wires the HTTP clients for the configured services.
    ///
    /// # Errors
    ///
    /// Returns an error if any client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let recognizer =
            VisionClient::new(&config.vision_endpoint, &config.vision_api_key, config.http_timeout)?;
        let completions = LlmClient::new(
            &config.openai_endpoint,
            config.openai_api_key.clone(),
            config.openai_deployment.clone(),
            config.openai_api_version.clone(),
            config.http_timeout,
        )?;
        let repository = GithubClient::new(
            config.github_username.clone(),
            config.github_token.clone(),
            config.http_timeout,
        )?;

        Ok(Self::new(recognizer, completions, repository, PipelineSettings::from(config)))
    }
}

impl<V, L, G> Pipeline<V, L, G>
where
    V: TextRecognizer,
    L: CompletionProvider,
    G: RepositoryContents,
{
    pub fn new(recognizer: V, completions: L, repository: G, settings: PipelineSettings) -> Self {
        Self {
            recognizer,
            completions,
            repository,
            settings,
        }
    }

    pub fn recognizer(&self) -> &V {
        &self.recognizer
    }

    pub fn completions(&self) -> &L {
        &self.completions
    }

    pub fn repository(&self) -> &G {
        &self.repository
    }

    /// # Errors
    ///
    /// Text extraction and completion failures end the run. Baseline lookup
    /// failures are reported inline and do not.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<PipelineReport, PipelineError> {
        writeln!(out, "{RULE}")?;
        writeln!(out, "READ LOCAL IMAGE")?;
        writeln!(out)?;

        let document =
            extract_text(&self.recognizer, &self.settings.image_path, &self.settings.poll).await?;
        let text = document.text();

        writeln!(out, "Extracted Text from Image:")?;
        writeln!(out, "{text}")?;

        let identified = identify_services(&self.completions, &text).await?;
        writeln!(out, "Identified Services:")?;
        for service in &identified.services {
            writeln!(out, "- {service}")?;
        }
        writeln!(out)?;

        let recommendation_input = match self.settings.recommend_from {
            RecommendationSource::Services => identified.services.join(", "),
            RecommendationSource::Text => text.clone(),
        };
        let recommendations = generate_recommendations(
            &self.completions,
            &self.settings.recommend_templates,
            &recommendation_input,
        )
        .await?;

        writeln!(out, "Recommended Actions:")?;
        for recommendation in &recommendations {
            writeln!(out, "{}", recommendation.trim())?;
        }
        writeln!(out)?;

        let baselines = resolve_service_list(
            &self.repository,
            &self.settings.baseline_repo,
            self.settings.baseline_mode,
            &identified.raw,
            &self.settings.extra_lookups,
        )
        .await;

        writeln!(out, "Security Baselines:")?;
        for (service, outcome) in &baselines.entries {
            writeln!(out, "{service}: {outcome}")?;
        }

        info!(
            "Run complete: {} lines, {} services, {}/{} baselines found",
            document.lines.len(),
            identified.services.len(),
            baselines.found_count(),
            baselines.entries.len()
        );

        Ok(PipelineReport {
            document,
            services: identified.services,
            recommendations,
            baselines,
        })
    }
}

use tracing::info;

use crate::ai::prompt_builder::PromptTemplate;
use crate::clients::CompletionProvider;
use crate::errors::PipelineError;
use crate::utils::matching::parse_service_list;

/// Renders `template` with `text` and returns the first completion.
///
/// The returned text is passed through unchanged.
pub async fn generate_completion<P>(
    provider: &P,
    template: &PromptTemplate,
    text: &str,
) -> Result<String, PipelineError>
where
    P: CompletionProvider + ?Sized,
{
    let prompt = template.render(text);
    info!("Running `{}` prompt ({} chars)", template.name, prompt.len());
    provider.complete(&prompt, &template.params).await
}

/// One completion per template, in template order.
pub async fn generate_recommendations<P>(
    provider: &P,
    templates: &[PromptTemplate],
    text: &str,
) -> Result<Vec<String>, PipelineError>
where
    P: CompletionProvider + ?Sized,
{
    let mut recommendations = Vec::with_capacity(templates.len());
    for template in templates {
        recommendations.push(generate_completion(provider, template, text).await?);
    }
    Ok(recommendations)
}

/// Services identified in the text and the raw completion they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedServices {
    pub raw: String,
    pub services: Vec<String>,
}

/// Asks the model which cloud services `text` mentions.
pub async fn identify_services<P>(provider: &P, text: &str) -> Result<IdentifiedServices, PipelineError>
where
    P: CompletionProvider + ?Sized,
{
    let raw = generate_completion(provider, &PromptTemplate::service_identification(), text).await?;
    let services = parse_service_list(&raw);
    info!("Identified {} candidate services", services.len());
    Ok(IdentifiedServices { raw, services })
}

//! Prompt templates and the tuning parameters that travel with them.

/// Placeholder replaced with the input text.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Sampling knobs sent with a completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: Option<f32>,
}

/// A fixed prompt with one `{text}` slot and its tuning parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub template: &'static str,
    pub params: CompletionParams,
}

impl PromptTemplate {
    /// Interpolates `text` literally into the template.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        self.template.replace(TEXT_PLACEHOLDER, text)
    }

    /// Looks up a built-in template by its `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::service_identification(),
            Self::recommendations(),
            Self::keywords(),
        ]
        .into_iter()
        .find(|template| template.name == name.trim())
    }

    /// Asks for the cloud services mentioned in a diagram, as a comma-separated list.
    #[must_use]
    pub fn service_identification() -> Self {
        Self {
            name: "service_identification",
            template: "You are a Microsoft security engineer doing threat model analysis. \
                Given the following text extracted from an architecture diagram:\n{text}\n\
                List the Azure cloud services used in the diagram as a single comma-separated \
                list of service names, with no other text:",
            params: CompletionParams {
                max_tokens: 100,
                temperature: 0.2,
                top_p: None,
            },
        }
    }

    #[must_use]
    pub fn recommendations() -> Self {
        Self {
            name: "recommendations",
            template: "You are a Microsoft security engineer providing recommendations to \
                identify and mitigate risk in a threat model. Given the following:\n{text}\n\
                Provide security recommendations:",
            params: CompletionParams {
                max_tokens: 500,
                temperature: 0.7,
                top_p: Some(0.95),
            },
        }
    }

    #[must_use]
    pub fn keywords() -> Self {
        Self {
            name: "keywords",
            template: " You are a Microsoft security engineer doing threat model analysis to \
                identity and mitigate risk. Given the following text:\n{text}\n  \
                Please provide the relevant keywords from the image:",
            params: CompletionParams {
                max_tokens: 100,
                temperature: 1.0,
                top_p: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_interpolates_text_verbatim() {
        let template = PromptTemplate::service_identification();
        let rendered = template.render("VM\nStorage\n");

        assert!(rendered.contains("diagram:\nVM\nStorage\n\n"));
        assert!(!rendered.contains(TEXT_PLACEHOLDER));
    }

    #[test]
    fn test_every_template_has_a_placeholder() {
        for template in [
            PromptTemplate::service_identification(),
            PromptTemplate::recommendations(),
            PromptTemplate::keywords(),
        ] {
            assert!(
                template.template.contains(TEXT_PLACEHOLDER),
                "{} has no placeholder",
                template.name
            );
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PromptTemplate::from_name(" keywords "), Some(PromptTemplate::keywords()));
        assert_eq!(
            PromptTemplate::from_name("recommendations"),
            Some(PromptTemplate::recommendations())
        );
        assert_eq!(PromptTemplate::from_name("summary"), None);
    }

    #[test]
    fn test_only_recommendations_use_nucleus_sampling() {
        assert_eq!(PromptTemplate::recommendations().params.top_p, Some(0.95));
        assert_eq!(PromptTemplate::service_identification().params.top_p, None);
    }
}

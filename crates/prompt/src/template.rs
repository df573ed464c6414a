//! Handlebars prompt templates with context and question placeholders.

use handlebars::Handlebars;
use serde::Serialize;
use sibyl_core::{AppError, AppResult};

/// Template used when the configuration does not provide one.
pub const DEFAULT_TEMPLATE: &str =
    "Using the following context: {{context}},\n answer: {{question}}";

/// Registered name of the single template held by a [`PromptTemplate`].
const TEMPLATE_NAME: &str = "prompt";

/// Variables available to every prompt template.
#[derive(Serialize)]
struct TemplateVars<'a> {
    context: &'a str,
    question: &'a str,
}

/// A compiled prompt template.
///
/// Every template must reference both the `{{context}}` and `{{question}}`
/// placeholders; registration and validation happen once at construction,
/// rendering is cheap per query.
pub struct PromptTemplate {
    registry: Handlebars<'static>,
    source: String,
}

impl PromptTemplate {
    /// Compile a template from its source text.
    pub fn new(source: impl Into<String>) -> AppResult<Self> {
        let source = source.into();

        for placeholder in ["{{context}}", "{{question}}"] {
            if !source.contains(placeholder) {
                return Err(AppError::Prompt(format!(
                    "Template is missing the {} placeholder",
                    placeholder
                )));
            }
        }

        let mut registry = Handlebars::new();

        // Plain text prompts, no HTML escaping
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, &source)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self { registry, source })
    }

    /// Render the template for one query turn.
    pub fn render(&self, question: &str, context: &str) -> AppResult<String> {
        self.registry
            .render(TEMPLATE_NAME, &TemplateVars { context, question })
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
    }

    /// Source text the template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("source", &self.source)
            .finish()
    }
}

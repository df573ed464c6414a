//! Backend and wrapper registries.
//!
//! Configuration tags map to explicit constructors. Nothing is resolved
//! dynamically from configuration strings beyond these tags, so a config
//! file can only ever select code that is compiled into the binary.

use sibyl_core::config::{BackendConfig, WrapperConfig};
use sibyl_core::{AppError, AppResult};
use sibyl_prompt::{PromptTemplate, DEFAULT_TEMPLATE};

use crate::backend::QaBackend;
use crate::bot::Bot;
use crate::chain::{
    AnswerStage, AppendUrl, Assistant, FinalAnswer, FullSentence, MinCertainty,
    WithPromptTemplate,
};
use crate::providers::{ExtractiveBackend, MockBackend, OllamaBackend};

/// Create a backend from its configuration tag.
///
/// Known tags:
/// - `ollama`: generative model served by a local Ollama runtime
/// - `extractive`: hosted question-answering span model (requires an
///   endpoint)
/// - `mock`: deterministic offline answers
pub fn create_backend(config: &BackendConfig) -> AppResult<Box<dyn QaBackend>> {
    match config.kind.as_str() {
        "ollama" => {
            let template = match config.prompt_template.as_deref() {
                Some(text) => PromptTemplate::new(text)?,
                None => PromptTemplate::new(DEFAULT_TEMPLATE)?,
            };

            let base_url = config
                .endpoint
                .as_deref()
                .unwrap_or(OllamaBackend::DEFAULT_URL);
            let model = config.model.as_deref().unwrap_or("llama3");

            Ok(Box::new(
                OllamaBackend::new(base_url, model, template)
                    .with_sampling(config.temperature, config.max_tokens),
            ))
        }
        "extractive" => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                AppError::Config("The extractive backend requires an endpoint".to_string())
            })?;

            let api_key = match config.api_key_env.as_deref() {
                Some(var) => std::env::var(var).ok(),
                None => None,
            };

            Ok(Box::new(ExtractiveBackend::new(endpoint, api_key)))
        }
        "mock" => Ok(Box::new(MockBackend::extractive())),
        other => Err(AppError::Config(format!("Unknown backend kind: {}", other))),
    }
}

/// Assemble the wrapper chain around the answer core.
///
/// Wrappers are listed innermost first; each entry wraps everything built
/// so far. `final-answer` is terminal: it may only occupy the outermost
/// slot, and any other position aborts with a construction error before a
/// single query runs.
pub fn build_assistant(bot: Bot, wrappers: &[WrapperConfig]) -> AppResult<Assistant> {
    let mut stage: Box<dyn AnswerStage> = Box::new(bot);

    for (pos, wrapper) in wrappers.iter().enumerate() {
        stage = match wrapper.kind.as_str() {
            "min-certainty" => {
                let mut built = MinCertainty::new(stage);
                if let Some(threshold) = wrapper.threshold {
                    built = built.with_threshold(threshold);
                }
                Box::new(built)
            }
            "append-url" => Box::new(AppendUrl::new(stage)),
            "full-sentence" => Box::new(FullSentence::new(stage)?),
            "set-prompt" => {
                let text = wrapper.prompt_template.as_deref().ok_or_else(|| {
                    AppError::Construction(
                        "The set-prompt wrapper requires a prompt_template".to_string(),
                    )
                })?;
                Box::new(WithPromptTemplate::new(stage, PromptTemplate::new(text)?)?)
            }
            "final-answer" => {
                if pos + 1 != wrappers.len() {
                    return Err(AppError::Construction(
                        "The final-answer wrapper is terminal and cannot be wrapped".to_string(),
                    ));
                }
                return Ok(Assistant::text(FinalAnswer::new(stage)));
            }
            other => {
                return Err(AppError::Construction(format!(
                    "Unknown wrapper kind: {}",
                    other
                )));
            }
        };
    }

    Ok(Assistant::record(stage))
}

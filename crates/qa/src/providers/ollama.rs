//! Ollama generative backend.
//!
//! Renders the prompt template over the question and its context, then
//! calls the Ollama generate API.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sibyl_core::{AppError, AppResult};
use sibyl_prompt::PromptTemplate;

use crate::backend::QaBackend;
use crate::record::BackendOutput;

/// Ollama generate request body.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    stream: bool,
}

/// Ollama generate response body.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Generative backend talking to a local Ollama runtime.
pub struct OllamaBackend {
    base_url: String,
    model: String,
    template: PromptTemplate,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OllamaBackend {
    /// Default Ollama endpoint.
    pub const DEFAULT_URL: &'static str = "http://localhost:11434";

    /// Create a backend for `model` served at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            template,
            temperature: None,
            max_tokens: None,
            client: reqwest::Client::new(),
        }
    }

    /// Set the sampling parameters.
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// The active prompt template source, for diagnostics.
    pub fn template_source(&self) -> &str {
        self.template.source()
    }
}

#[async_trait]
impl QaBackend for OllamaBackend {
    fn backend_name(&self) -> &str {
        "ollama"
    }

    async fn invoke(&self, question: &str, context: &str) -> AppResult<BackendOutput> {
        let prompt = self.template.render(question, context)?;

        let body = OllamaRequest {
            model: &self.model,
            prompt,
            temperature: self.temperature,
            num_predict: self.max_tokens,
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!("Sending generate request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Backend(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            prompt_tokens = ?parsed.prompt_eval_count,
            completion_tokens = ?parsed.eval_count,
            "Ollama generation finished"
        );

        Ok(BackendOutput {
            answer: parsed.response,
            score: None,
            span: None,
        })
    }

    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()> {
        self.template = template;
        Ok(())
    }
}

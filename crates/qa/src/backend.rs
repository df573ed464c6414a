//! Backend abstraction for comprehension and generation models.

use async_trait::async_trait;
use sibyl_core::{AppError, AppResult};
use sibyl_prompt::PromptTemplate;

use crate::record::BackendOutput;

/// A comprehension/generation backend.
///
/// Extractive backends locate an answer span inside the supplied context
/// and report a confidence score; generative backends render a prompt
/// template and produce free text, leaving `score` and `span` unset.
#[async_trait]
pub trait QaBackend: Send + Sync {
    /// Backend name, for logs and diagnostics.
    fn backend_name(&self) -> &str;

    /// Answer `question` against `context`.
    async fn invoke(&self, question: &str, context: &str) -> AppResult<BackendOutput>;

    /// Replace the prompt template.
    ///
    /// Only generative backends take one; the default rejects the call so
    /// a misconfigured chain fails while it is being wired, not mid-query.
    fn set_prompt_template(&mut self, _template: PromptTemplate) -> AppResult<()> {
        Err(AppError::Construction(format!(
            "Backend '{}' does not take a prompt template",
            self.backend_name()
        )))
    }
}

//! The answer core: retrieval plus backend inference.

use std::sync::Arc;

use async_trait::async_trait;
use sibyl_core::{AppError, AppResult};
use sibyl_prompt::PromptTemplate;
use sibyl_retrieval::Retriever;

use crate::backend::QaBackend;
use crate::chain::AnswerStage;
use crate::record::AnswerRecord;

/// Number of documents retrieved when the configuration does not say.
pub const DEFAULT_K_DOCS: usize = 3;

/// The answer core.
///
/// Runs retrieval, invokes the backend over the concatenated context and
/// merges both results into one record. The retriever and the backend are
/// injected; the core adds nothing on top of their behavior, not even
/// retries.
pub struct Bot {
    retriever: Arc<dyn Retriever>,
    backend: Box<dyn QaBackend>,
    k_docs: usize,
}

impl Bot {
    /// Create the answer core with the default document count.
    pub fn new(retriever: Arc<dyn Retriever>, backend: Box<dyn QaBackend>) -> Self {
        Self {
            retriever,
            backend,
            k_docs: DEFAULT_K_DOCS,
        }
    }

    /// Override the number of retrieved documents per query.
    pub fn with_k_docs(mut self, k_docs: usize) -> Self {
        self.k_docs = k_docs;
        self
    }

    /// Answer `query`, feeding the `k_docs` best documents to the backend.
    pub async fn answer_with(&self, query: &str, k_docs: usize) -> AppResult<AnswerRecord> {
        let retrieved = self.retriever.get_context(query, k_docs)?;
        tracing::debug!("Retrieved {} documents for the query", retrieved.ids.len());

        let output = self.backend.invoke(query, &retrieved.context).await?;
        let record = AnswerRecord::merge(retrieved, output);

        // Backends must report spans inside the context they were given.
        if let Some((start, end)) = record.span {
            if start > end || end > record.context.len() {
                return Err(AppError::Backend(format!(
                    "Answer span {}..{} escapes the {}-byte context",
                    start,
                    end,
                    record.context.len()
                )));
            }
        }

        Ok(record)
    }
}

#[async_trait]
impl AnswerStage for Bot {
    async fn answer(&self, query: &str) -> AppResult<AnswerRecord> {
        self.answer_with(query, self.k_docs).await
    }

    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()> {
        self.backend.set_prompt_template(template)
    }
}

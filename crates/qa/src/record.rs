//! The answer record threaded through retrieval, inference and wrappers.

use sibyl_core::{AppError, AppResult};
use sibyl_retrieval::RetrievedContext;

/// Output of a comprehension/generation backend.
///
/// Extractive backends fill every field; generative backends produce only
/// the answer text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendOutput {
    /// Answer text
    pub answer: String,

    /// Model confidence, when the backend reports one
    pub score: Option<f32>,

    /// Answer span as byte offsets into the context, when the backend
    /// locates one
    pub span: Option<(usize, usize)>,
}

/// The structured result of one query turn.
///
/// Retrieval fills `ids`, `context` and `ranges` (plus `urls` for
/// URL-aware retrievers); the backend fills `answer` and, for extractive
/// models, `score` and `span`. Wrappers read and rewrite `answer` on the
/// way back up the chain. One record lives per query and is owned
/// exclusively by the worker that computes it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    /// Collection indices of the retrieved documents, ranked order
    pub ids: Vec<usize>,

    /// Concatenated contents of the retrieved documents
    pub context: String,

    /// Half-open byte ranges bounding each document inside `context`
    pub ranges: Vec<(usize, usize)>,

    /// Source URLs parallel to `ids`, when retrieval exposes them
    pub urls: Option<Vec<String>>,

    /// Answer text
    pub answer: String,

    /// Backend confidence, absent for generative backends
    pub score: Option<f32>,

    /// Answer span inside `context`, absent for generative backends
    pub span: Option<(usize, usize)>,
}

impl AnswerRecord {
    /// Merge the backend output over the retrieved context. Backend fields
    /// win; the retrieval bookkeeping is carried through untouched.
    pub fn merge(retrieved: RetrievedContext, output: BackendOutput) -> Self {
        Self {
            ids: retrieved.ids,
            context: retrieved.context,
            ranges: retrieved.ranges,
            urls: retrieved.urls,
            answer: output.answer,
            score: output.score,
            span: output.span,
        }
    }

    /// Confidence score, or `MissingField` for backends that report none.
    pub fn require_score(&self) -> AppResult<f32> {
        self.score.ok_or(AppError::MissingField("score"))
    }

    /// Answer span, or `MissingField` for backends that report none.
    pub fn require_span(&self) -> AppResult<(usize, usize)> {
        self.span.ok_or(AppError::MissingField("span"))
    }

    /// Source URLs, or `MissingField` when retrieval did not attach them.
    pub fn require_urls(&self) -> AppResult<&[String]> {
        self.urls.as_deref().ok_or(AppError::MissingField("urls"))
    }
}

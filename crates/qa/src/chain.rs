//! The wrapper chain: composable answer post-processors.
//!
//! Each wrapper exclusively owns the next inner stage; the innermost stage
//! is the answer core itself. The chain is assembled once at startup from
//! configuration and is immutable afterwards — the construction-time
//! prompt-template push is the only mutation, through an explicit setter.

use async_trait::async_trait;
use regex::Regex;
use sibyl_core::{AppError, AppResult};
use sibyl_prompt::PromptTemplate;

use crate::record::AnswerRecord;

/// Fallback answer used when confidence is below the certainty threshold.
pub const FALLBACK_ANSWER: &str =
    "Je suis désolée, je ne sais pas comment répondre à cette question.";

/// Suffix prepended to the source URL by the attribution wrapper.
const URL_SUFFIX: &str = "\n\n Pour plus d'informations, accédez ";

/// Default certainty threshold.
pub const DEFAULT_CERTAINTY_THRESHOLD: f32 = 0.01;

/// A stage of the answer pipeline: the answer core or any wrapper around
/// it.
#[async_trait]
pub trait AnswerStage: Send + Sync {
    /// Produce the answer record for `query`.
    async fn answer(&self, query: &str) -> AppResult<AnswerRecord>;

    /// Push a prompt template down to the answer core's backend.
    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()>;
}

/// Replaces low-confidence answers with a fixed apology.
///
/// The bound is exclusive: a score exactly equal to the threshold keeps
/// the original answer. Requires the inner stage to report a score.
pub struct MinCertainty {
    inner: Box<dyn AnswerStage>,
    threshold: f32,
}

impl MinCertainty {
    /// Wrap `inner` with the default threshold.
    pub fn new(inner: Box<dyn AnswerStage>) -> Self {
        Self {
            inner,
            threshold: DEFAULT_CERTAINTY_THRESHOLD,
        }
    }

    /// Override the certainty threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

#[async_trait]
impl AnswerStage for MinCertainty {
    async fn answer(&self, query: &str) -> AppResult<AnswerRecord> {
        let mut record = self.inner.answer(query).await?;

        if record.require_score()? < self.threshold {
            tracing::debug!(
                score = record.score,
                threshold = self.threshold,
                "Answer below the certainty threshold, replacing"
            );
            record.answer = FALLBACK_ANSWER.to_string();
        }

        Ok(record)
    }

    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()> {
        self.inner.set_prompt_template(template)
    }
}

/// Appends the source URL of the document containing the answer span.
///
/// The first range containing the span wins; a span outside every range
/// falls back to the last document. Requires the span and the URLs.
pub struct AppendUrl {
    inner: Box<dyn AnswerStage>,
}

impl AppendUrl {
    /// Wrap `inner`.
    pub fn new(inner: Box<dyn AnswerStage>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AnswerStage for AppendUrl {
    async fn answer(&self, query: &str) -> AppResult<AnswerRecord> {
        let mut record = self.inner.answer(query).await?;

        let url = {
            let (start, end) = record.require_span()?;
            let urls = record.require_urls()?;

            if record.ranges.is_empty() {
                return Err(AppError::MissingField("ranges"));
            }

            let mut idx = record.ranges.len() - 1;
            for (i, &(lo, hi)) in record.ranges.iter().enumerate() {
                if start >= lo && end <= hi {
                    idx = i;
                    break;
                }
            }

            urls.get(idx).cloned().unwrap_or_default()
        };

        record.answer.push_str(URL_SUFFIX);
        record.answer.push_str(&url);
        Ok(record)
    }

    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()> {
        self.inner.set_prompt_template(template)
    }
}

/// Replaces the answer with the full sentence containing it.
///
/// The paragraph around the answer span is found by scanning the context
/// outward for newlines; it is split into sentences on terminal
/// punctuation followed by whitespace, and the answer is overwritten by
/// every sentence containing it — so the last match wins. Requires the
/// span.
pub struct FullSentence {
    inner: Box<dyn AnswerStage>,
    boundary: Regex,
}

impl FullSentence {
    /// Wrap `inner`.
    pub fn new(inner: Box<dyn AnswerStage>) -> AppResult<Self> {
        let boundary = Regex::new(r"[.!?]\s")
            .map_err(|e| AppError::Construction(format!("Invalid sentence boundary: {}", e)))?;
        Ok(Self { inner, boundary })
    }
}

#[async_trait]
impl AnswerStage for FullSentence {
    async fn answer(&self, query: &str) -> AppResult<AnswerRecord> {
        let mut record = self.inner.answer(query).await?;
        let (start, end) = record.require_span()?;

        let context = record.context.clone();
        let bytes = context.as_bytes();

        // Paragraph bounds: nearest newline scanning outward from the
        // span, falling back to the span's own edges at the string
        // boundaries.
        let sop = (0..=start)
            .rev()
            .find(|&i| bytes.get(i) == Some(&b'\n'))
            .unwrap_or(start);
        let eop = (end..context.len())
            .find(|&i| bytes[i] == b'\n')
            .unwrap_or(end);

        // The paragraph starts one past the boundary even when the scan
        // fell back to the span start; a slice that misses a character
        // boundary leaves the answer untouched.
        let Some(paragraph) = context.get(sop + 1..eop) else {
            return Ok(record);
        };

        let mut sentences = Vec::new();
        let mut last = 0;
        for m in self.boundary.find_iter(paragraph) {
            sentences.push(&paragraph[last..m.start() + 1]);
            last = m.end();
        }
        sentences.push(&paragraph[last..]);

        for sentence in sentences {
            if sentence.contains(record.answer.as_str()) {
                record.answer = sentence.to_string();
            }
        }

        Ok(record)
    }

    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()> {
        self.inner.set_prompt_template(template)
    }
}

/// Pushes a prompt template into the chain at construction, then delegates
/// every call unchanged.
///
/// Valid only when the inner chain terminates in a generative answer core;
/// anything else rejects the template while the pipeline is being wired.
pub struct WithPromptTemplate {
    inner: Box<dyn AnswerStage>,
}

impl WithPromptTemplate {
    /// Set `template` on the inner chain's backend and wrap `inner`.
    pub fn new(mut inner: Box<dyn AnswerStage>, template: PromptTemplate) -> AppResult<Self> {
        inner.set_prompt_template(template)?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl AnswerStage for WithPromptTemplate {
    async fn answer(&self, query: &str) -> AppResult<AnswerRecord> {
        self.inner.answer(query).await
    }

    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()> {
        self.inner.set_prompt_template(template)
    }
}

/// Terminal wrapper collapsing the record to the bare answer string.
///
/// Deliberately not an [`AnswerStage`]: nothing can wrap it, which makes
/// the "absolute wrapper" rule a type-level guarantee. The registry
/// additionally rejects it in any non-outermost configuration slot.
pub struct FinalAnswer {
    inner: Box<dyn AnswerStage>,
}

impl FinalAnswer {
    /// Wrap `inner`.
    pub fn new(inner: Box<dyn AnswerStage>) -> Self {
        Self { inner }
    }

    /// Answer `query` and return only the answer text.
    pub async fn answer(&self, query: &str) -> AppResult<String> {
        Ok(self.inner.answer(query).await?.answer)
    }
}

/// The fully assembled answer pipeline handed to the interactive loop.
pub enum Assistant {
    /// A chain ending in a record-producing stage
    Record(Box<dyn AnswerStage>),
    /// A chain collapsed by the terminal wrapper
    Text(FinalAnswer),
}

impl Assistant {
    /// Assemble from a record-producing chain.
    pub fn record(stage: Box<dyn AnswerStage>) -> Self {
        Assistant::Record(stage)
    }

    /// Assemble from a terminally collapsed chain.
    pub fn text(terminal: FinalAnswer) -> Self {
        Assistant::Text(terminal)
    }

    /// Answer `query`, yielding the final answer text either way.
    pub async fn answer(&self, query: &str) -> AppResult<String> {
        match self {
            Assistant::Record(stage) => Ok(stage.answer(query).await?.answer),
            Assistant::Text(terminal) => terminal.answer(query).await,
        }
    }
}

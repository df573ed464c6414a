//! Deterministic mock backend for offline runs and tests.

use async_trait::async_trait;
use sibyl_core::{AppError, AppResult};
use sibyl_prompt::PromptTemplate;

use crate::backend::QaBackend;
use crate::record::BackendOutput;

/// Mock backend returning canned values.
///
/// By default the extractive variant answers with the first line of the
/// context, a perfect score and the matching span, which keeps the whole
/// pipeline exercisable without any model. Tests override individual
/// fields with the builder methods.
#[derive(Debug)]
pub struct MockBackend {
    answer: Option<String>,
    score: Option<f32>,
    span: Option<(usize, usize)>,
    locate: bool,
    template: Option<PromptTemplate>,
}

impl MockBackend {
    /// Extractive variant: echoes the first context line with score 1.0
    /// and its span.
    pub fn extractive() -> Self {
        Self {
            answer: None,
            score: Some(1.0),
            span: None,
            locate: true,
            template: None,
        }
    }

    /// Generative variant: answer text only, no score or span, and a
    /// settable prompt template.
    pub fn generative() -> Self {
        Self {
            answer: None,
            score: None,
            span: None,
            locate: false,
            template: None,
        }
    }

    /// Fixed answer instead of the context echo.
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Fixed confidence score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Fixed answer span.
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some((start, end));
        self
    }

    /// The active prompt template source, if one was pushed.
    pub fn template_source(&self) -> Option<&str> {
        self.template.as_ref().map(|t| t.source())
    }
}

#[async_trait]
impl QaBackend for MockBackend {
    fn backend_name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, _question: &str, context: &str) -> AppResult<BackendOutput> {
        let first_line_len = context.find('\n').unwrap_or(context.len());

        let answer = self
            .answer
            .clone()
            .unwrap_or_else(|| context[..first_line_len].to_string());

        let span = self.span.or_else(|| {
            if self.locate {
                Some((0, first_line_len))
            } else {
                None
            }
        });

        Ok(BackendOutput {
            answer,
            score: self.score,
            span,
        })
    }

    fn set_prompt_template(&mut self, template: PromptTemplate) -> AppResult<()> {
        if self.locate {
            return Err(AppError::Construction(
                "Backend 'mock' (extractive) does not take a prompt template".to_string(),
            ));
        }
        self.template = Some(template);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sibyl_prompt::DEFAULT_TEMPLATE;

    #[tokio::test]
    async fn test_extractive_echoes_first_line() {
        let backend = MockBackend::extractive();
        let output = backend.invoke("question ?", "AAAA\nBB").await.unwrap();

        assert_eq!(output.answer, "AAAA");
        assert_eq!(output.score, Some(1.0));
        assert_eq!(output.span, Some((0, 4)));
    }

    #[tokio::test]
    async fn test_generative_has_no_score_or_span() {
        let backend = MockBackend::generative().with_answer("texte libre");
        let output = backend.invoke("question ?", "AAAA\nBB").await.unwrap();

        assert_eq!(output.answer, "texte libre");
        assert_eq!(output.score, None);
        assert_eq!(output.span, None);
    }

    #[tokio::test]
    async fn test_canned_values_win() {
        let backend = MockBackend::extractive()
            .with_answer("AA")
            .with_score(0.5)
            .with_span(1, 3);
        let output = backend.invoke("question ?", "AAAA\nBB").await.unwrap();

        assert_eq!(output.answer, "AA");
        assert_eq!(output.score, Some(0.5));
        assert_eq!(output.span, Some((1, 3)));
    }

    #[test]
    fn test_extractive_rejects_template() {
        let mut backend = MockBackend::extractive();
        let template = PromptTemplate::new(DEFAULT_TEMPLATE).unwrap();

        assert!(matches!(
            backend.set_prompt_template(template),
            Err(AppError::Construction(_))
        ));
    }

    #[test]
    fn test_generative_accepts_template() {
        let mut backend = MockBackend::generative();
        let template = PromptTemplate::new(DEFAULT_TEMPLATE).unwrap();

        backend.set_prompt_template(template).unwrap();
        assert_eq!(backend.template_source(), Some(DEFAULT_TEMPLATE));
    }
}

//! Hosted extractive question-answering backend.
//!
//! Posts `{question, context}` to a question-answering inference endpoint
//! and maps the returned answer span. The endpoint follows the JSON shape
//! of hosted QA pipelines: `{"answer", "score", "start", "end"}` with
//! offsets local to the submitted context.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sibyl_core::{AppError, AppResult};

use crate::backend::QaBackend;
use crate::record::BackendOutput;

/// Question-answering request body.
#[derive(Debug, Serialize)]
struct SpanRequest<'a> {
    inputs: SpanInputs<'a>,
}

#[derive(Debug, Serialize)]
struct SpanInputs<'a> {
    question: &'a str,
    context: &'a str,
}

/// Question-answering response body.
#[derive(Debug, Deserialize)]
struct SpanResponse {
    answer: String,
    score: f32,
    start: usize,
    end: usize,
}

/// Extractive backend calling a hosted question-answering model.
pub struct ExtractiveBackend {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ExtractiveBackend {
    /// Create a backend for the given inference endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl QaBackend for ExtractiveBackend {
    fn backend_name(&self) -> &str {
        "extractive"
    }

    async fn invoke(&self, question: &str, context: &str) -> AppResult<BackendOutput> {
        let body = SpanRequest {
            inputs: SpanInputs { question, context },
        };

        tracing::debug!("Sending question-answering request to {}", self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::Backend(format!("Failed to reach the answering endpoint: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Backend(format!(
                "Answering endpoint error ({}): {}",
                status, error_text
            )));
        }

        let parsed: SpanResponse = response.json().await.map_err(|e| {
            AppError::Backend(format!("Failed to parse the answering response: {}", e))
        })?;

        tracing::debug!(
            score = parsed.score,
            start = parsed.start,
            end = parsed.end,
            "Extractive answer located"
        );

        Ok(BackendOutput {
            answer: parsed.answer,
            score: Some(parsed.score),
            span: Some((parsed.start, parsed.end)),
        })
    }
}

//! Retriever registry.
//!
//! Maps a configuration tag to a concrete retriever constructor. Nothing
//! is resolved dynamically from configuration strings beyond these tags.

use std::sync::Arc;

use sibyl_core::config::RetrieverConfig;
use sibyl_core::{AppError, AppResult};

use crate::document::DocumentSet;
use crate::retriever::{Retriever, TfIdfRetriever, WithUrls};

/// Create a retriever from its configuration tag.
///
/// Known tags:
/// - `tfidf`: TF-IDF ranking over the configured index fields
/// - `tfidf-urls`: same ranking, with source URLs attached to every result
pub fn create_retriever(
    config: &RetrieverConfig,
    docs: Arc<DocumentSet>,
) -> AppResult<Arc<dyn Retriever>> {
    match config.kind.as_str() {
        "tfidf" => Ok(Arc::new(TfIdfRetriever::new(docs, &config.index_fields)?)),
        "tfidf-urls" => {
            let base = TfIdfRetriever::new(docs.clone(), &config.index_fields)?;
            Ok(Arc::new(WithUrls::new(base, docs)?))
        }
        other => Err(AppError::Config(format!(
            "Unknown retriever kind: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn docs() -> Arc<DocumentSet> {
        Arc::new(DocumentSet::new(vec![Document {
            content: "contenu".to_string(),
            url: Some("https://a.example".to_string()),
            title: None,
        }]))
    }

    fn config(kind: &str) -> RetrieverConfig {
        RetrieverConfig {
            kind: kind.to_string(),
            index_fields: vec!["content".to_string()],
        }
    }

    #[test]
    fn test_create_tfidf() {
        assert!(create_retriever(&config("tfidf"), docs()).is_ok());
    }

    #[test]
    fn test_create_tfidf_urls() {
        let retriever = create_retriever(&config("tfidf-urls"), docs()).unwrap();
        let retrieved = retriever.get_context("contenu", 1).unwrap();
        assert!(retrieved.urls.is_some());
    }

    #[test]
    fn test_unknown_kind() {
        match create_retriever(&config("bm25"), docs()) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown retriever kind")),
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }
    }
}

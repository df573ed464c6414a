//! Ranked retrieval over the document collection.
//!
//! A retriever scores every document against the query and concatenates
//! the top-k contents into a single context string, together with the
//! bookkeeping needed to map an answer span back to its source document.

use std::sync::Arc;

use sibyl_core::{AppError, AppResult};

use crate::document::DocumentSet;
use crate::tfidf::TfIdfIndex;

/// The retrieval slice of an answer record.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    /// Collection indices of the selected documents, ranked order
    pub ids: Vec<usize>,

    /// Selected contents joined by a single newline, ranked order
    pub context: String,

    /// Half-open byte ranges bounding each document inside `context`,
    /// parallel to `ids`
    pub ranges: Vec<(usize, usize)>,

    /// Source URLs parallel to `ids`, attached by URL-aware retrievers
    pub urls: Option<Vec<String>>,
}

/// Scores documents against a query and returns the top-k as context.
pub trait Retriever: Send + Sync {
    /// Retrieve the `k_docs` best-ranking documents for `query`.
    ///
    /// Returns all documents, ranked, when `k_docs` exceeds the collection
    /// size. Fails with `EmptyCollection` when `k_docs > 0` but the
    /// collection holds no documents.
    fn get_context(&self, query: &str, k_docs: usize) -> AppResult<RetrievedContext>;
}

/// TF-IDF ranked retriever.
///
/// The index is fitted once at construction and never mutated by queries.
pub struct TfIdfRetriever {
    docs: Arc<DocumentSet>,
    index: TfIdfIndex,
}

impl TfIdfRetriever {
    /// Build the retriever, fitting the index over the named document
    /// fields.
    pub fn new(docs: Arc<DocumentSet>, index_fields: &[String]) -> AppResult<Self> {
        let texts = docs.index_text(index_fields)?;
        let index = TfIdfIndex::fit(&texts);

        tracing::debug!(
            "Fitted TF-IDF index: {} documents, {} terms",
            index.len(),
            index.vocabulary_size()
        );

        Ok(Self { docs, index })
    }
}

impl Retriever for TfIdfRetriever {
    fn get_context(&self, query: &str, k_docs: usize) -> AppResult<RetrievedContext> {
        if k_docs > 0 && self.docs.is_empty() {
            return Err(AppError::EmptyCollection);
        }

        let ranked = self.index.rank(query);
        let ids: Vec<usize> = ranked.iter().take(k_docs).map(|&(id, _)| id).collect();

        // Each range starts after all previous contents plus one separator
        // per join, so `context[lo..hi]` is exactly the document's content.
        let mut context = String::new();
        let mut ranges = Vec::with_capacity(ids.len());
        let mut offset = 0usize;

        for (pos, &id) in ids.iter().enumerate() {
            let content = &self.docs.docs()[id].content;

            if pos > 0 {
                context.push('\n');
                offset += 1;
            }

            ranges.push((offset, offset + content.len()));
            context.push_str(content);
            offset += content.len();
        }

        tracing::debug!(
            "Retrieved {} documents ({} bytes of context)",
            ids.len(),
            context.len()
        );

        Ok(RetrievedContext {
            ids,
            context,
            ranges,
            urls: None,
        })
    }
}

/// Wraps a base retriever and attaches the source URL of every selected
/// document, delegating the ranking itself.
pub struct WithUrls<R> {
    inner: R,
    docs: Arc<DocumentSet>,
}

impl<R: Retriever> WithUrls<R> {
    /// Compose over `inner`. Every document in the collection must expose
    /// a URL.
    pub fn new(inner: R, docs: Arc<DocumentSet>) -> AppResult<Self> {
        docs.require_urls()?;
        Ok(Self { inner, docs })
    }
}

impl<R: Retriever> Retriever for WithUrls<R> {
    fn get_context(&self, query: &str, k_docs: usize) -> AppResult<RetrievedContext> {
        let mut retrieved = self.inner.get_context(query, k_docs)?;

        let urls = retrieved
            .ids
            .iter()
            .map(|&id| self.docs.docs()[id].url.clone().unwrap_or_default())
            .collect();
        retrieved.urls = Some(urls);

        Ok(retrieved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc(content: &str, url: &str) -> Document {
        Document {
            content: content.to_string(),
            url: Some(url.to_string()),
            title: None,
        }
    }

    fn content_field() -> Vec<String> {
        vec!["content".to_string()]
    }

    #[test]
    fn test_two_document_scenario() {
        let docs = Arc::new(DocumentSet::new(vec![
            doc("AAAA", "u1"),
            doc("BB", "u2"),
        ]));
        let base = TfIdfRetriever::new(docs.clone(), &content_field()).unwrap();
        let retriever = WithUrls::new(base, docs).unwrap();

        let retrieved = retriever.get_context("aaaa", 2).unwrap();

        assert_eq!(retrieved.context, "AAAA\nBB");
        assert_eq!(retrieved.ranges, vec![(0, 4), (5, 7)]);
        assert_eq!(retrieved.ids, vec![0, 1]);
        assert_eq!(
            retrieved.urls,
            Some(vec!["u1".to_string(), "u2".to_string()])
        );
    }

    #[test]
    fn test_ranges_round_trip() {
        let docs = Arc::new(DocumentSet::new(vec![
            doc("le chat dort", "u1"),
            doc("le chien aboie fort", "u2"),
            doc("les oiseaux chantent", "u3"),
            doc("le chat chasse les oiseaux", "u4"),
        ]));
        let retriever = TfIdfRetriever::new(docs.clone(), &content_field()).unwrap();

        let retrieved = retriever.get_context("chat oiseaux", 3).unwrap();

        assert_eq!(retrieved.ids.len(), 3);
        assert_eq!(retrieved.ranges.len(), 3);
        for (pos, &(lo, hi)) in retrieved.ranges.iter().enumerate() {
            let id = retrieved.ids[pos];
            assert_eq!(&retrieved.context[lo..hi], docs.docs()[id].content);
        }
    }

    #[test]
    fn test_contiguous_ranges() {
        let docs = Arc::new(DocumentSet::new(vec![
            doc("un", "u1"),
            doc("deux", "u2"),
            doc("trois", "u3"),
        ]));
        let retriever = TfIdfRetriever::new(docs, &content_field()).unwrap();

        let retrieved = retriever.get_context("un deux trois", 3).unwrap();

        for window in retrieved.ranges.windows(2) {
            // next range starts right after the single separator
            assert_eq!(window[1].0, window[0].1 + 1);
        }
    }

    #[test]
    fn test_ranking_is_stable_on_ties() {
        let docs = Arc::new(DocumentSet::new(vec![
            doc("pareil", "u1"),
            doc("pareil", "u2"),
            doc("pareil", "u3"),
        ]));
        let retriever = TfIdfRetriever::new(docs, &content_field()).unwrap();

        let retrieved = retriever.get_context("pareil", 3).unwrap();
        assert_eq!(retrieved.ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_k_docs_exceeding_collection_returns_all() {
        let docs = Arc::new(DocumentSet::new(vec![doc("seul", "u1")]));
        let retriever = TfIdfRetriever::new(docs, &content_field()).unwrap();

        let retrieved = retriever.get_context("seul", 10).unwrap();
        assert_eq!(retrieved.ids, vec![0]);
        assert_eq!(retrieved.context, "seul");
    }

    #[test]
    fn test_zero_k_docs_returns_empty_context() {
        let docs = Arc::new(DocumentSet::new(vec![doc("texte", "u1")]));
        let retriever = TfIdfRetriever::new(docs, &content_field()).unwrap();

        let retrieved = retriever.get_context("texte", 0).unwrap();
        assert!(retrieved.ids.is_empty());
        assert!(retrieved.context.is_empty());
        assert!(retrieved.ranges.is_empty());
    }

    #[test]
    fn test_empty_collection_is_an_error() {
        let docs = Arc::new(DocumentSet::new(Vec::new()));
        let retriever = TfIdfRetriever::new(docs, &content_field()).unwrap();

        assert!(matches!(
            retriever.get_context("rien", 2),
            Err(AppError::EmptyCollection)
        ));
    }

    #[test]
    fn test_with_urls_requires_url_column() {
        let docs = Arc::new(DocumentSet::new(vec![Document {
            content: "sans lien".to_string(),
            url: None,
            title: None,
        }]));
        let base = TfIdfRetriever::new(docs.clone(), &content_field()).unwrap();

        assert!(matches!(
            WithUrls::new(base, docs),
            Err(AppError::InvalidColumn(field)) if field == "url"
        ));
    }
}

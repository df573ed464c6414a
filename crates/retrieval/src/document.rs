//! Document collection types.

use serde::{Deserialize, Serialize};
use sibyl_core::{AppError, AppResult};

/// A single document of the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Raw text handed to the backend as answer context
    pub content: String,

    /// Source URL, when the collection carries one
    #[serde(default)]
    pub url: Option<String>,

    /// Document title, when the collection carries one
    #[serde(default)]
    pub title: Option<String>,
}

/// An ordered, indexable document collection.
///
/// Immutable after load; shared read-only between the retriever and the
/// answer core for the lifetime of the bot.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    docs: Vec<Document>,
}

impl DocumentSet {
    /// Wrap a loaded collection.
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    /// Number of documents in the collection.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the collection holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// The documents in collection order.
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    /// The document at `idx`, if any.
    pub fn get(&self, idx: usize) -> Option<&Document> {
        self.docs.get(idx)
    }

    /// Concatenate the named fields of every document into its indexable
    /// text, in collection order.
    ///
    /// Only `content` and `title` are addressable; any other field name is
    /// an `InvalidColumn` error.
    pub fn index_text(&self, fields: &[String]) -> AppResult<Vec<String>> {
        let mut texts = Vec::with_capacity(self.docs.len());

        for doc in &self.docs {
            let mut parts = Vec::with_capacity(fields.len());
            for field in fields {
                let part = match field.as_str() {
                    "content" => doc.content.as_str(),
                    "title" => doc.title.as_deref().unwrap_or(""),
                    other => return Err(AppError::InvalidColumn(other.to_string())),
                };
                parts.push(part);
            }
            texts.push(parts.join("\n"));
        }

        Ok(texts)
    }

    /// Check that every document exposes a URL.
    ///
    /// URL-aware retrieval refuses collections where any document lacks
    /// one, so the failure surfaces at construction rather than mid-query.
    pub fn require_urls(&self) -> AppResult<()> {
        if self.docs.iter().any(|doc| doc.url.is_none()) {
            return Err(AppError::InvalidColumn("url".to_string()));
        }
        Ok(())
    }
}

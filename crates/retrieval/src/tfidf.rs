//! TF-IDF term weighting over the document collection.
//!
//! The index is fitted once at construction: a vocabulary over the
//! collection's indexable texts, smoothed inverse document frequencies,
//! and one L2-normalized sparse vector per document. Queries are projected
//! into the same space and scored by dot product, so the score is the
//! cosine similarity of the weighted term vectors. Queries never mutate
//! the index.

use std::collections::{HashMap, HashSet};

/// Minimum token length kept by the tokenizer. Single characters carry
/// almost no ranking signal and only inflate the vocabulary.
const MIN_TOKEN_CHARS: usize = 2;

/// A fitted TF-IDF index.
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    doc_vectors: Vec<Vec<(usize, f32)>>,
}

impl TfIdfIndex {
    /// Fit the index over the collection's indexable texts, one entry per
    /// document, in collection order.
    pub fn fit(texts: &[String]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();
        let mut doc_tokens: Vec<Vec<String>> = Vec::with_capacity(texts.len());

        for text in texts {
            let tokens = tokenize(text);

            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                let term = match vocabulary.get(token) {
                    Some(&term) => term,
                    None => {
                        let term = vocabulary.len();
                        vocabulary.insert(token.clone(), term);
                        doc_freq.push(0);
                        term
                    }
                };
                doc_freq[term] += 1;
            }

            doc_tokens.push(tokens);
        }

        // smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = texts.len() as f32;
        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let doc_vectors = doc_tokens
            .iter()
            .map(|tokens| weighted_vector(tokens, &vocabulary, &idf))
            .collect();

        Self {
            vocabulary,
            idf,
            doc_vectors,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_vectors.len()
    }

    /// Whether the index covers no documents.
    pub fn is_empty(&self) -> bool {
        self.doc_vectors.is_empty()
    }

    /// Number of distinct terms in the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Relevance score of every document against `query`, in collection
    /// order. Query tokens outside the vocabulary are ignored.
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let query_vector = weighted_vector(&tokenize(query), &self.vocabulary, &self.idf);

        self.doc_vectors
            .iter()
            .map(|doc_vector| dot(&query_vector, doc_vector))
            .collect()
    }

    /// Rank every document by descending relevance to `query`.
    ///
    /// The sort is stable: equal-score documents keep their collection
    /// order.
    pub fn rank(&self, query: &str) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.scores(query).into_iter().enumerate().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Lowercase and split on non-alphanumeric characters, dropping tokens
/// shorter than [`MIN_TOKEN_CHARS`].
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(|token| token.to_string())
        .collect()
}

/// Term-frequency vector weighted by idf and L2-normalized, sorted by term
/// id. Tokens outside the vocabulary are ignored.
fn weighted_vector(
    tokens: &[String],
    vocabulary: &HashMap<String, usize>,
    idf: &[f32],
) -> Vec<(usize, f32)> {
    let mut counts: HashMap<usize, f32> = HashMap::new();
    for token in tokens {
        if let Some(&term) = vocabulary.get(token) {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }
    }

    let mut vector: Vec<(usize, f32)> = counts
        .into_iter()
        .map(|(term, tf)| (term, tf * idf[term]))
        .collect();
    vector.sort_unstable_by_key(|&(term, _)| term);

    let norm: f32 = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in vector.iter_mut() {
            *w /= norm;
        }
    }

    vector
}

/// Dot product of two sparse vectors sorted by term id.
fn dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let mut sum = 0.0;
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    sum
}

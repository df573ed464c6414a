//! Ranked retrieval for the sibyl assistant.
//!
//! Loads the document collection from SQLite, fits a TF-IDF index over it
//! once at startup, and serves top-k context retrieval for every query.
//! The collection and the fitted index are read-only after construction
//! and safely shared across query turns.

pub mod document;
pub mod factory;
pub mod retriever;
pub mod store;
pub mod tfidf;

// Re-export commonly used types
pub use document::{Document, DocumentSet};
pub use factory::create_retriever;
pub use retriever::{RetrievedContext, Retriever, TfIdfRetriever, WithUrls};
pub use tfidf::TfIdfIndex;

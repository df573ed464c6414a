//! Answer pipeline for the sibyl assistant.
//!
//! This crate hosts the answer record, the backend abstraction and its
//! providers, the answer core, and the composable wrapper chain.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use sibyl_qa::{providers::MockBackend, Assistant, Bot};
//! use sibyl_retrieval::{Document, DocumentSet, TfIdfRetriever};
//!
//! # async fn example() -> sibyl_core::AppResult<()> {
//! let docs = Arc::new(DocumentSet::new(vec![Document {
//!     content: "Le ciel est bleu.".to_string(),
//!     url: None,
//!     title: None,
//! }]));
//! let retriever = TfIdfRetriever::new(docs, &["content".to_string()])?;
//! let bot = Bot::new(Arc::new(retriever), Box::new(MockBackend::extractive()));
//! let assistant = Assistant::record(Box::new(bot));
//! println!("{}", assistant.answer("de quelle couleur est le ciel ?").await?);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod bot;
pub mod chain;
pub mod factory;
pub mod providers;
pub mod record;

// Re-export main types
pub use backend::QaBackend;
pub use bot::Bot;
pub use chain::{AnswerStage, Assistant, FinalAnswer, FALLBACK_ANSWER};
pub use factory::{build_assistant, create_backend};
pub use record::{AnswerRecord, BackendOutput};

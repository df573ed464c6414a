//! Prompt templating for generative backends.
//!
//! A prompt template turns a question and its retrieved context into the
//! single prompt string handed to a text-generation model.

pub mod template;

// Re-export main types
pub use template::{PromptTemplate, DEFAULT_TEMPLATE};

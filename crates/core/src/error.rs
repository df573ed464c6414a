//! Error types for the sibyl assistant.
//!
//! This module defines a unified error enum that covers all error
//! categories in the workspace: configuration, document retrieval, backend
//! inference, and wrapper composition.

use thiserror::Error;

/// Unified error type for the sibyl assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Illegal wrapper or backend composition, detected while wiring the
    /// pipeline at startup
    #[error("Construction error: {0}")]
    Construction(String),

    /// A wrapper required an answer-record field the inner stage did not
    /// produce
    #[error("Answer record is missing the '{0}' field")]
    MissingField(&'static str),

    /// The document collection lacks a column the retriever was asked to use
    #[error("Document collection has no '{0}' column")]
    InvalidColumn(String),

    /// Retrieval was asked for documents but the collection is empty
    #[error("Cannot retrieve from an empty document collection")]
    EmptyCollection,

    /// Document store and ranking errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Comprehension/generation backend errors
    #[error("Backend error: {0}")]
    Backend(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

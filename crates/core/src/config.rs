//! Configuration management for the sibyl assistant.
//!
//! A single YAML file describes the whole bot: where the document
//! collection comes from, which retriever ranks it, which backend answers,
//! and the ordered wrapper chain applied to every answer. The file path is
//! given on the command line; a few flags override logging afterwards.
//!
//! Every component is named by a registry tag — configuration can only
//! select known constructors, never evaluate expressions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Top-level bot configuration, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Document collection source
    pub documents: DocumentsConfig,

    /// Ranked-retrieval settings
    pub retriever: RetrieverConfig,

    /// Comprehension/generation backend settings
    pub backend: BackendConfig,

    /// Ordered wrapper chain, innermost first
    #[serde(default)]
    pub wrappers: Vec<WrapperConfig>,

    /// Answering defaults
    #[serde(default)]
    pub answer: AnswerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how to load the document collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Path to the SQLite database
    pub path: PathBuf,

    /// Query producing the collection. Must select a `content` column;
    /// `url` and `title` are picked up when present.
    pub query: String,
}

/// Retriever selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Registry tag ("tfidf" or "tfidf-urls")
    pub kind: String,

    /// Document fields concatenated into the indexable text
    #[serde(default = "default_index_fields")]
    pub index_fields: Vec<String>,
}

fn default_index_fields() -> Vec<String> {
    vec!["content".to_string()]
}

/// Backend selection and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Registry tag ("ollama", "extractive" or "mock")
    pub kind: String,

    /// Model identifier, for backends that take one
    #[serde(default)]
    pub model: Option<String>,

    /// HTTP endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key for hosted endpoints
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Prompt template for generative backends
    #[serde(default)]
    pub prompt_template: Option<String>,

    /// Sampling temperature for generative backends
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Generation cap for generative backends
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// One wrapper entry in the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperConfig {
    /// Registry tag ("min-certainty", "append-url", "full-sentence",
    /// "set-prompt" or "final-answer")
    pub kind: String,

    /// Certainty threshold, used by "min-certainty"
    #[serde(default)]
    pub threshold: Option<f32>,

    /// Template text, used by "set-prompt"
    #[serde(default)]
    pub prompt_template: Option<String>,
}

/// Answering defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// Number of top-ranked documents fed to the backend
    #[serde(default = "default_k_docs")]
    pub k_docs: usize,
}

fn default_k_docs() -> usize {
    3
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            k_docs: default_k_docs(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level override (e.g. "debug", "info")
    #[serde(default)]
    pub level: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

impl BotConfig {
    /// Load the configuration from a YAML file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: BotConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        config.validate()?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the config file.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(level) = log_level {
            self.logging.level = Some(level);
        }

        if verbose && self.logging.level.is_none() {
            // Verbose mode implies debug logging
            self.logging.level = Some("debug".to_string());
        }

        if no_color {
            self.logging.no_color = true;
        }

        self
    }

    /// Sanity checks that do not need the documents loaded.
    fn validate(&self) -> AppResult<()> {
        if self.documents.query.trim().is_empty() {
            return Err(AppError::Config(
                "documents.query must not be empty".to_string(),
            ));
        }

        if self.answer.k_docs == 0 {
            return Err(AppError::Config(
                "answer.k_docs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

//! Sibyl core library.
//!
//! This crate provides the foundational utilities for the sibyl assistant:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::BotConfig;
pub use error::{AppError, AppResult};

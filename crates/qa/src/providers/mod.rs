//! Backend provider implementations.

pub mod extractive;
pub mod mock;
pub mod ollama;

pub use extractive::ExtractiveBackend;
pub use mock::MockBackend;
pub use ollama::OllamaBackend;

//! Bracket-Fetch: bracketed URL resolver
//!
//! This crate scans a text stream for `[...]` groups, resolves the last URL in
//! each group, fetches it under a single-lane rate limit with one delayed
//! retry, and emits one JSON record per unique URL.

pub mod config;
pub mod input;
pub mod output;
pub mod processor;
pub mod state;
pub mod tokenizer;
pub mod url;

use thiserror::Error;

/// Main error type for Bracket-Fetch operations
///
/// Failures of individual URLs never surface here; they are absorbed by the
/// retry scheduler and reported through the diagnostic channel.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input stream error: {0}")]
    Input(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors produced by a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP status {code}")]
    Status { code: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns true if the failure happened while establishing the
    /// connection, which is where certificate and handshake errors show up.
    pub fn allows_protocol_fallback(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result type alias for Bracket-Fetch operations
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch attempts
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::{ProcessorConfig, UserAgentConfig};
pub use output::{Diagnostic, JsonLinesOutput, MemoryOutput, OutputHandler, OutputRecord};
pub use processor::{process_text, Processor, RunSummary};
pub use state::ProcessorState;
pub use tokenizer::{BracketGroup, BracketTokenizer};
pub use url::{canonicalize, extract_url};

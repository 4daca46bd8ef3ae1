//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the
//! record and diagnostic types they receive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One result line, emitted exactly once per scheduled URL
///
/// `title` and `email_hash` are omitted from the JSON when absent; they are
/// never written as empty strings or nulls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// The canonical URL
    pub url: String,

    /// Trimmed text of the first `<title>` element, if non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Hex SHA-256 digest of the first email in the body plus the secret
    #[serde(
        rename = "email",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub email_hash: Option<String>,
}

impl OutputRecord {
    /// Creates a record carrying only the URL
    pub fn url_only(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            email_hash: None,
        }
    }

    /// Serializes the record as a single JSON line (without the newline)
    pub fn to_json_line(&self) -> OutputResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Human-readable notices for URLs whose first attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A retry timer was armed
    RetryScheduled { url: String, delay: Duration },

    /// The retry failed as well; the record carries only the URL
    FinalFailure { url: String, cause: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryScheduled { url, delay } => {
                write!(f, "Retrying {} in {:?}", url, delay)
            }
            Self::FinalFailure { url, cause } => {
                write!(f, "Final failure for {}: {}", url, cause)
            }
        }
    }
}

/// Trait for output handlers
///
/// The processor calls `record` once per canonical URL, in completion order,
/// and `diagnostic` for retry and final-failure notices. Records and
/// diagnostics travel on separate channels.
pub trait OutputHandler {
    /// Records the result for one URL
    fn record(&mut self, record: &OutputRecord) -> OutputResult<()>;

    /// Reports a diagnostic notice
    ///
    /// The default implementation logs through `tracing`, which the binary
    /// routes to stderr.
    fn diagnostic(&mut self, diagnostic: &Diagnostic) -> OutputResult<()> {
        match diagnostic {
            Diagnostic::RetryScheduled { .. } => tracing::warn!("{}", diagnostic),
            Diagnostic::FinalFailure { .. } => tracing::error!("{}", diagnostic),
        }
        Ok(())
    }

    /// Flushes any buffered output once the run is complete
    fn finalize(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

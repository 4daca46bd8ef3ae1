//! Configuration module for Bracket-Fetch
//!
//! The processor is driven by a handful of constants (retry delay, fetch
//! timeout, rate-limit interval) plus the hashing secret. Production values
//! come from `ProcessorConfig::new`; tests and fast runs override them.
//!
//! # Example
//!
//! ```
//! use bracket_fetch::config::ProcessorConfig;
//! use std::time::Duration;
//!
//! let config = ProcessorConfig::new("s3cret");
//! assert_eq!(config.retry_delay, Duration::from_secs(60));
//! assert!(config.validate().is_ok());
//! ```

mod types;
mod validation;

// Re-export types
pub use types::{
    ProcessorConfig, UserAgentConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_REDIRECTS,
    DEFAULT_RATE_LIMIT_INTERVAL, DEFAULT_RETRY_DELAY, FAST_RETRY_DELAY,
};

pub use validation::validate;

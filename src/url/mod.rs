//! URL handling module for Bracket-Fetch
//!
//! This module provides URL extraction from bracket groups, scheme
//! canonicalization, and the secure-to-insecure scheme downgrade used by the
//! protocol fallback.

mod extract;
mod scheme;

// Re-export main functions
pub use extract::{extract_url, find_url_tokens};
pub use scheme::{canonicalize, downgrade_to_http, has_scheme, is_secure};

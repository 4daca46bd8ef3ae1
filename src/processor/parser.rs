//! Result builder for fetched pages
//!
//! This module turns a fetched body into an output record:
//! - Page title (first `<title>` element, trimmed, non-empty)
//! - First email-shaped substring anywhere in the raw body, hashed with the
//!   run secret

use crate::output::OutputRecord;
use regex::Regex;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Regex pattern for email addresses (shape only, no validation)
#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

/// Extracted information from a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// The first email address found in the raw body
    pub email: Option<String>,
}

/// Parses a fetched body and extracts the title and first email
///
/// The email scan runs over the raw text, not the parsed DOM, so addresses
/// inside attributes, scripts, or comments count too.
///
/// # Example
///
/// ```
/// use bracket_fetch::processor::parse_html;
///
/// let html = "<html><head><title> Test </title></head><body>me@example.com</body></html>";
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.email, Some("me@example.com".to_string()));
/// ```
pub fn parse_html(body: &str) -> ParsedPage {
    let document = Html::parse_document(body);

    ParsedPage {
        title: extract_title(&document),
        email: extract_email(body).map(str::to_string),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Finds the first email-shaped substring in the text
pub fn extract_email(text: &str) -> Option<&str> {
    EMAIL_PATTERN.find(text).map(|m| m.as_str())
}

/// Computes the hex SHA-256 digest of `email + secret`
pub fn hash_email(email: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds the output record for a successfully fetched page
pub fn build_record(url: &str, body: &str, secret: &str) -> OutputRecord {
    let parsed = parse_html(body);

    OutputRecord {
        url: url.to_string(),
        title: parsed.title,
        email_hash: parsed.email.map(|email| hash_email(&email, secret)),
    }
}

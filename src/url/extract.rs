use crate::tokenizer::BracketGroup;
use crate::url::canonicalize;
use regex::Regex;
use std::sync::LazyLock;

/// URL-shaped token: optional http(s) scheme, then `localhost[:port]` or a
/// dotted hostname ending in a label of two or more letters, then an
/// optional path or query
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:localhost(?::\d+)?|(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,})(?:[/?#][^\s\[\]]*)?",
    )
    .expect("valid regex")
});

/// Finds every URL-shaped token in the text, left to right
pub fn find_url_tokens(text: &str) -> Vec<&str> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Resolves a bracket group to its canonical URL
///
/// The outer brackets are stripped and the text is scanned for URL-shaped
/// tokens. When several are present, the last one wins; earlier tokens in
/// the same group are dropped.
///
/// # Arguments
///
/// * `group` - The bracket group emitted by the tokenizer
///
/// # Returns
///
/// * `Some(String)` - The canonical URL (`https://` prepended if needed)
/// * `None` - The group contains no URL-shaped token
///
/// # Examples
///
/// ```
/// use bracket_fetch::tokenizer::BracketGroup;
/// use bracket_fetch::url::extract_url;
///
/// let group = BracketGroup::from("[www.a.com www.b.com]");
/// assert_eq!(extract_url(&group), Some("https://www.b.com".to_string()));
/// ```
pub fn extract_url(group: &BracketGroup) -> Option<String> {
    let token = find_url_tokens(group.inner()).pop()?;
    Some(canonicalize(token))
}

use url::Url;

const SECURE_PREFIX: &str = "https://";
const INSECURE_PREFIX: &str = "http://";

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Returns true if the token already carries an http or https scheme
pub fn has_scheme(token: &str) -> bool {
    starts_with_ignore_case(token, SECURE_PREFIX) || starts_with_ignore_case(token, INSECURE_PREFIX)
}

/// Returns true if the URL uses the secure scheme
pub fn is_secure(url: &str) -> bool {
    starts_with_ignore_case(url, SECURE_PREFIX)
}

/// Produces the canonical form of a URL token
///
/// Tokens without a scheme get `https://` prepended; everything else is
/// left untouched, so the result doubles as the deduplication key.
///
/// # Examples
///
/// ```
/// use bracket_fetch::url::canonicalize;
///
/// assert_eq!(canonicalize("www.google.com"), "https://www.google.com");
/// assert_eq!(canonicalize("https://www.google.com"), "https://www.google.com");
/// ```
pub fn canonicalize(token: &str) -> String {
    if has_scheme(token) {
        token.to_string()
    } else {
        format!("{}{}", SECURE_PREFIX, token)
    }
}

/// Rewrites a secure URL to the insecure scheme, keeping host and path
///
/// Returns None if the URL is not secure or cannot be parsed.
pub fn downgrade_to_http(url: &str) -> Option<String> {
    if !is_secure(url) {
        return None;
    }

    let mut parsed = Url::parse(url).ok()?;
    parsed.set_scheme("http").ok()?;
    Some(parsed.to_string())
}

use std::fmt;

/// The full text of one top-level `[...]` match, outer brackets included
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BracketGroup(String);

impl BracketGroup {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    /// Returns the group text including its brackets
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the text between the outer brackets
    ///
    /// Exactly one leading `[` and one trailing `]` are removed, and only
    /// when both are present.
    pub fn inner(&self) -> &str {
        self.0
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(&self.0)
    }

    /// Consumes the group, returning its text
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BracketGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BracketGroup {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

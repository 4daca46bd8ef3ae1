//! Streaming bracket tokenizer
//!
//! This module turns an arbitrarily chunked text stream into top-level
//! bracket groups, including:
//! - Nested brackets kept verbatim inside the enclosing group
//! - Backslash escapes that neutralize the following character
//! - State that survives chunk boundaries, even mid-escape

mod group;

pub use group::BracketGroup;

/// Incremental `[...]` group parser
///
/// The tokenizer can be fed one character at a time or the whole input at
/// once; the sequence of emitted groups is identical either way.
///
/// # Examples
///
/// ```
/// use bracket_fetch::tokenizer::BracketTokenizer;
///
/// let mut tokenizer = BracketTokenizer::new();
/// assert!(tokenizer.feed("see [a [b").is_empty());
///
/// let groups = tokenizer.feed("] c] done");
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].as_str(), "[a [b] c]");
/// ```
#[derive(Debug, Default, Clone)]
pub struct BracketTokenizer {
    /// Current nesting depth (0 means outside any group)
    depth: usize,

    /// Text of the group being built, meaningful only while `depth > 0`
    accumulator: String,

    /// Whether the previous character was an unconsumed backslash
    escaped: bool,
}

impl BracketTokenizer {
    /// Creates a tokenizer positioned outside any group
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of text and returns the groups it completed, in order
    pub fn feed(&mut self, chunk: &str) -> Vec<BracketGroup> {
        let mut groups = Vec::new();

        for c in chunk.chars() {
            if let Some(group) = self.push_char(c) {
                groups.push(group);
            }
        }

        groups
    }

    /// Ends the stream, discarding any unterminated group
    ///
    /// Returns true if a partial group was dropped.
    pub fn finish(&mut self) -> bool {
        let discarded = self.depth > 0;
        if discarded {
            tracing::debug!(
                "Discarding unterminated bracket group ({} bytes)",
                self.accumulator.len()
            );
        }

        self.depth = 0;
        self.accumulator.clear();
        self.escaped = false;
        discarded
    }

    /// Returns the current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Applies the transition rules for a single character
    fn push_char(&mut self, c: char) -> Option<BracketGroup> {
        if self.escaped {
            // Escaped characters never change depth, brackets included
            if self.depth > 0 {
                self.accumulator.push(c);
            }
            self.escaped = false;
            return None;
        }

        match c {
            '\\' => {
                self.escaped = true;
                if self.depth > 0 {
                    self.accumulator.push('\\');
                }
                None
            }
            '[' => {
                self.depth += 1;
                if self.depth == 1 {
                    self.accumulator.clear();
                }
                self.accumulator.push('[');
                None
            }
            ']' => {
                if self.depth == 0 {
                    // Unmatched closer
                    return None;
                }

                self.accumulator.push(']');
                self.depth -= 1;

                if self.depth == 0 {
                    let text = std::mem::take(&mut self.accumulator);
                    Some(BracketGroup::new(text))
                } else {
                    None
                }
            }
            _ => {
                if self.depth > 0 {
                    self.accumulator.push(c);
                }
                None
            }
        }
    }
}

/// Convenience function for tokenizing a complete input in one call
pub fn tokenize(input: &str) -> Vec<BracketGroup> {
    let mut tokenizer = BracketTokenizer::new();
    let groups = tokenizer.feed(input);
    tokenizer.finish();
    groups
}

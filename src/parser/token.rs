use serde::Serialize;
use std::fmt;

/// Zero-based location of a token in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TokenLocation {
    /// Byte offset from the start of the text
    pub position: usize,
    /// Line number
    pub line: usize,
    /// Characters since the start of the line
    pub column: usize,
}

impl TokenLocation {
    /// Compute line and column for a byte offset into `text`.
    #[must_use]
    pub fn from_offset(text: &str, position: usize) -> Self {
        let before = text.get(..position).unwrap_or(text);
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            position,
            line: super::strip::count_newlines(before.as_bytes()),
            column: before[line_start..].chars().count(),
        }
    }
}

/// An identifier found in GML source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GmlToken {
    /// Identifier text
    pub name: String,
    /// Where the identifier starts
    pub location: TokenLocation,
}

impl GmlToken {
    /// Create a token at a byte offset of `text`.
    #[must_use]
    pub fn at(name: impl Into<String>, text: &str, position: usize) -> Self {
        Self {
            name: name.into(),
            location: TokenLocation::from_offset(text, position),
        }
    }
}

impl fmt::Display for GmlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.location.line + 1, self.location.column + 1)
    }
}

/// A reference to a function that may carry a version suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedReference {
    /// The matched identifier, suffix included
    pub token: GmlToken,
    /// The name that was searched for
    pub expected: String,
    /// The suffix portion of the match (empty when absent)
    pub suffix: String,
}

impl VersionedReference {
    /// Whether the reference names exactly the searched version.
    #[must_use]
    pub fn is_correct_version(&self) -> bool {
        self.token.name == self.expected
    }
}

//! Located markdown image references.

use std::ops::Range;

/// Shape of a markdown image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Vault embed: `![[name.png]]`.
    Embed,
    /// Inline data URI: `![alt](data:image/png;base64,...)`.
    Base64,
    /// Remote image: `![alt](https://...)`.
    Remote,
}

impl LinkKind {
    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Embed => "embed",
            Self::Base64 => "base64",
            Self::Remote => "remote",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A markdown image reference found in a text blob.
///
/// Matches are produced by one scan and consumed in the same pass; the span
/// is only valid against the exact text that was scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    /// Link shape.
    pub kind: LinkKind,
    /// Full matched text.
    pub raw: String,
    /// Byte span of `raw` inside the scanned text.
    pub span: Range<usize>,
    /// Vault path, full data URI, or URL.
    pub reference: String,
    /// Alt text between `![` and `]`. Empty for embeds.
    pub alt: String,
}

impl LinkMatch {
    /// Byte offset where the match starts.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.span.start
    }

    /// Byte offset one past the end of the match.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.end
    }

    /// Returns true if a cursor at `offset` sits on the match, including
    /// right after its last byte.
    #[must_use]
    pub const fn touches(&self, offset: usize) -> bool {
        self.span.start <= offset && offset <= self.span.end
    }

    /// Returns true for `http://` and `https://` references.
    #[must_use]
    pub fn is_remote_reference(&self) -> bool {
        self.reference.starts_with("http")
    }
}

//! Conversion error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Conversion error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConversionError {
    #[error("malformed data URI: {reason}")]
    MalformedDataUri { reason: String },

    #[error("cannot resolve image reference `{reference}`")]
    UnresolvedReference { reference: String },

    #[error("failed to fetch {url}: {message}")]
    RemoteFetchFailure { url: String, message: String },

    #[error("failed to read {}: {message}", path.display())]
    StorageRead { path: PathBuf, message: String },

    #[error("failed to write {}: {message}", path.display())]
    StorageWriteFailure { path: PathBuf, message: String },

    #[error("image scaling failed: {message}")]
    Scaling { message: String },

    #[error("no documents found for {scope}")]
    EmptyScope { scope: String },

    #[error("no image link at offset {offset}")]
    NoLinkAtCursor { offset: usize },
}

impl ConversionError {
    /// Creates malformed data URI error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDataUri {
            reason: reason.into(),
        }
    }

    /// Creates unresolved reference error.
    #[must_use]
    pub fn unresolved(reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
        }
    }

    /// Creates remote fetch error.
    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteFetchFailure {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates storage read error.
    #[must_use]
    pub fn read(path: &Path, message: impl Into<String>) -> Self {
        Self::StorageRead {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates storage write error.
    #[must_use]
    pub fn write(path: &Path, message: impl Into<String>) -> Self {
        Self::StorageWriteFailure {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates scaling error.
    #[must_use]
    pub fn scaling(message: impl Into<String>) -> Self {
        Self::Scaling {
            message: message.into(),
        }
    }

    /// Returns whether the link should be counted as skipped rather than failed.
    #[must_use]
    pub const fn counts_as_skip(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(!ConversionError::malformed("x").counts_as_skip());
        assert!(ConversionError::unresolved("a.png").counts_as_skip());
        assert!(!ConversionError::fetch("http://x", "timeout").counts_as_skip());
        assert!(!ConversionError::write(Path::new("a.md"), "denied").counts_as_skip());
    }

    #[test]
    fn test_display() {
        let err = ConversionError::write(Path::new("notes/a.md"), "read-only");
        assert_eq!(err.to_string(), "failed to write notes/a.md: read-only");
    }
}

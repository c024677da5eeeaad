//! Conversion scopes and per-document outcomes.

use std::path::PathBuf;

use serde::Serialize;

/// Set of documents a bulk conversion applies to.
///
/// The vault resolves a scope into a concrete document list; the conversion
/// engine only ever sees the resolved list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionScope {
    /// A single note.
    Note(PathBuf),
    /// Every note sharing the folder of the given note.
    Folder(PathBuf),
    /// Every note in the vault.
    Vault,
}

impl std::fmt::Display for ConversionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note(path) => write!(f, "note {}", path.display()),
            Self::Folder(path) => write!(f, "folder of {}", path.display()),
            Self::Vault => write!(f, "entire vault"),
        }
    }
}

/// Direction of a bulk conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionDirection {
    /// `![[img.png]]` to inline data URIs.
    EmbedToBase64,
    /// Inline data URIs to vault attachments.
    Base64ToEmbed,
}

impl ConversionDirection {
    /// Past-tense verb for summaries.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::EmbedToBase64 => "Converted",
            Self::Base64ToEmbed => "Exported",
        }
    }

    /// Verb used when a run finds nothing to do.
    #[must_use]
    pub const fn infinitive(self) -> &'static str {
        match self {
            Self::EmbedToBase64 => "convert",
            Self::Base64ToEmbed => "export",
        }
    }

    /// What skipped links are called in summaries.
    #[must_use]
    pub const fn skipped_label(self) -> &'static str {
        match self {
            Self::EmbedToBase64 => "",
            Self::Base64ToEmbed => " duplicates",
        }
    }
}

/// Outcome of converting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    /// Vault-relative document path.
    pub path: PathBuf,
    /// Whether the document text was rewritten.
    pub modified: bool,
    /// Links converted.
    pub converted: usize,
    /// Links skipped as duplicates, filtered, or unresolved.
    pub skipped: usize,
    /// Links that failed (malformed payload, fetch failure).
    pub failed: usize,
    /// Document-level failure, if the document could not be processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    /// Creates an empty result for a document.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Creates a result for a document that failed as a whole.
    #[must_use]
    pub fn failed(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Returns true if the document saw any matching link.
    #[must_use]
    pub const fn touched(&self) -> bool {
        self.converted + self.skipped + self.failed > 0
    }
}

/// Aggregate of a whole-scope run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeReport {
    /// Direction of the run.
    pub direction: ConversionDirection,
    /// Per-document results in vault order.
    pub documents: Vec<ConversionResult>,
}

impl ScopeReport {
    /// Creates a report from per-document results.
    #[must_use]
    pub const fn new(direction: ConversionDirection, documents: Vec<ConversionResult>) -> Self {
        Self {
            direction,
            documents,
        }
    }

    /// Total converted links.
    #[must_use]
    pub fn converted(&self) -> usize {
        self.documents.iter().map(|d| d.converted).sum()
    }

    /// Total skipped links.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.documents.iter().map(|d| d.skipped).sum()
    }

    /// Total failed links.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.documents.iter().map(|d| d.failed).sum()
    }

    /// Number of rewritten documents.
    #[must_use]
    pub fn modified_documents(&self) -> usize {
        self.documents.iter().filter(|d| d.modified).count()
    }

    /// Documents that failed as a whole.
    pub fn failed_documents(&self) -> impl Iterator<Item = &ConversionResult> {
        self.documents.iter().filter(|d| d.error.is_some())
    }

    /// One-line summary shown to the user at the end of a run.
    #[must_use]
    pub fn summary(&self) -> String {
        let converted = self.converted();
        let skipped = self.skipped();
        let failed = self.failed();
        let broken_docs = self.failed_documents().count();

        if converted == 0 && skipped == 0 && failed == 0 && broken_docs == 0 {
            return format!("No images found to {}", self.direction.infinitive());
        }

        let mut summary = format!(
            "{} {converted} images in {} documents, skipped {skipped}{}",
            self.direction.verb(),
            self.modified_documents(),
            self.direction.skipped_label()
        );
        if failed > 0 {
            summary.push_str(&format!(", {failed} failed"));
        }
        if broken_docs > 0 {
            summary.push_str(&format!(", {broken_docs} documents could not be processed"));
        }
        summary
    }
}

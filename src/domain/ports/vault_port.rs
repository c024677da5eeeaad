//! Vault storage port definition.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::entities::ConversionScope;
use crate::domain::errors::ConversionError;

/// Port for the document and attachment store.
///
/// All paths are vault-relative.
#[async_trait]
pub trait VaultPort: Send + Sync {
    /// Reads a binary file.
    async fn read_binary(&self, path: &Path) -> Result<Bytes, ConversionError>;

    /// Reads a text document.
    async fn read_text(&self, path: &Path) -> Result<String, ConversionError>;

    /// Replaces the content of a text document.
    async fn write_text(&self, path: &Path, content: &str) -> Result<(), ConversionError>;

    /// Creates a new binary file and returns its path.
    ///
    /// Never overwrites: fails with a storage error when `path` exists.
    async fn write_binary(&self, path: &Path, bytes: &[u8]) -> Result<PathBuf, ConversionError>;

    /// Resolves a scope to its markdown documents, sorted by path.
    async fn list_documents(&self, scope: &ConversionScope)
    -> Result<Vec<PathBuf>, ConversionError>;

    /// Maps an embed reference, as written in `from`, to a stored file.
    async fn resolve_link(&self, reference: &str, from: &Path) -> Option<PathBuf>;

    /// Where an attachment named `filename` belongs for notes at `from`.
    async fn attachment_path(&self, filename: &str, from: &Path) -> PathBuf;

    /// Like [`VaultPort::attachment_path`], numbered until no file exists there.
    async fn available_attachment_path(&self, filename: &str, from: &Path) -> PathBuf {
        let base = self.attachment_path(filename, from).await;
        let mut candidate = base.clone();
        let mut n = 1;
        while self.file_size(&candidate).await.is_some() {
            candidate = numbered_variant(&base, n);
            n += 1;
        }
        candidate
    }

    /// Size of a stored file, `None` when nothing exists at `path`.
    async fn file_size(&self, path: &Path) -> Option<u64>;

    /// Builds the embed link text for a stored file as seen from `from`.
    fn generate_link(&self, path: &Path, from: &Path) -> String;
}

/// Returns `dir/stem N.ext` for `dir/stem.ext`.
#[must_use]
pub fn numbered_variant(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem} {n}.{}", ext.to_string_lossy()),
        None => format!("{stem} {n}"),
    };
    path.with_file_name(name)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_variant() {
        assert_eq!(
            numbered_variant(Path::new("att/cat.png"), 2),
            PathBuf::from("att/cat 2.png")
        );
        assert_eq!(numbered_variant(Path::new("cat"), 1), PathBuf::from("cat 1"));
    }
}

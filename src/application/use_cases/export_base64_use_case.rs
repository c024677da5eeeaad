//! Base64 to attachment use case implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::application::dto::ConversionFilters;
use crate::application::services::{
    AttachmentLocks, Base64Codec, LinkFilter, LinkMatcher, Replacement,
};
use crate::domain::entities::{ConversionResult, ImageBuffer, LinkKind, LinkMatch, file_name_of};
use crate::domain::errors::ConversionError;
use crate::domain::ports::VaultPort;

const HASH_PREFIX_BYTES: usize = 6;

/// What happened to one exported link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A new attachment was written and `link` should replace the data URI.
    Written {
        /// Attachment path.
        path: PathBuf,
        /// Embed link pointing at it.
        link: String,
    },
    /// An attachment with the same name and size already exists.
    Duplicate {
        /// Existing attachment path.
        path: PathBuf,
    },
}

/// Moves inline data URIs out into vault attachments.
#[derive(Clone)]
pub struct ExportBase64UseCase {
    vault: Arc<dyn VaultPort>,
    locks: AttachmentLocks,
}

impl ExportBase64UseCase {
    /// Creates new export use case.
    #[must_use]
    pub fn new(vault: Arc<dyn VaultPort>) -> Self {
        Self {
            vault,
            locks: AttachmentLocks::new(),
        }
    }

    /// Exports every eligible base64 link in one document.
    ///
    /// Duplicates keep their inline link. The document is written back only
    /// when at least one link was replaced.
    ///
    /// # Errors
    /// Returns error if the document cannot be read or written.
    pub async fn convert_document(
        &self,
        path: &Path,
        filters: &ConversionFilters,
    ) -> Result<ConversionResult, ConversionError> {
        let text = self.vault.read_text(path).await?;
        let links = LinkMatcher::find_kind(&text, LinkKind::Base64);
        let filter = LinkFilter::new(filters);
        let mut result = ConversionResult::new(path);
        let mut replacements = Vec::new();

        for link in &links {
            if filter.should_skip(link) {
                result.skipped += 1;
                continue;
            }

            match self.export_link(link, path).await {
                Ok(ExportOutcome::Written { link: embed, .. }) => {
                    replacements.push(Replacement::for_link(link, embed));
                    result.converted += 1;
                }
                Ok(ExportOutcome::Duplicate { path: existing }) => {
                    debug!(attachment = %existing.display(), "Attachment already exists, keeping inline link");
                    result.skipped += 1;
                }
                Err(e) => {
                    warn!(document = %path.display(), error = %e, "Failed to export image");
                    result.failed += 1;
                }
            }
        }

        if !replacements.is_empty() {
            let output = LinkMatcher::splice(&text, replacements);
            self.vault.write_text(path, &output).await?;
            result.modified = true;
            info!(
                document = %path.display(),
                exported = result.converted,
                "Exported base64 images"
            );
        }

        self.locks.prune();
        Ok(result)
    }

    /// Writes the image behind one base64 link as an attachment.
    ///
    /// # Errors
    /// Returns `MalformedDataUri` for undecodable payloads or a storage error
    /// when the attachment cannot be written.
    pub async fn export_link(
        &self,
        link: &LinkMatch,
        from: &Path,
    ) -> Result<ExportOutcome, ConversionError> {
        let buffer = Base64Codec::decode(&link.reference)?;
        let filename = attachment_name(&link.alt, &buffer);
        let canonical = self.vault.attachment_path(&filename, from).await;

        let folder = canonical.parent().unwrap_or_else(|| Path::new(""));
        let _guard = self.locks.acquire(folder).await;

        if self.vault.file_size(&canonical).await == Some(buffer.size() as u64) {
            return Ok(ExportOutcome::Duplicate { path: canonical });
        }

        let target = self.vault.available_attachment_path(&filename, from).await;
        let written = self.vault.write_binary(&target, buffer.bytes()).await?;
        debug!(attachment = %written.display(), bytes = buffer.size(), "Wrote attachment");

        let link = self.vault.generate_link(&written, from);
        Ok(ExportOutcome::Written {
            path: written,
            link,
        })
    }

    /// Embed link for an existing attachment, as seen from `from`.
    #[must_use]
    pub fn link_to(&self, attachment: &Path, from: &Path) -> String {
        self.vault.generate_link(attachment, from)
    }
}

/// Picks the attachment file name for a decoded image.
///
/// Alt text that already names an image file is used as is; anything else
/// gets `image-<hash>.<ext>` so identical payloads map to the same name.
fn attachment_name(alt: &str, buffer: &ImageBuffer) -> String {
    let candidate = file_name_of(alt.trim());
    if !alt.trim().is_empty() && Base64Codec::mime_for_filename(candidate).is_some() {
        return candidate.to_string();
    }

    let digest = Sha256::digest(buffer.bytes());
    let ext = Base64Codec::extension_for_mime(&Base64Codec::mime_of(buffer));
    format!("image-{}.{ext}", hex::encode(&digest[..HASH_PREFIX_BYTES]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MemoryVault;

    const NOTE: &str = "see ![cat.png](data:image/png;base64,Zm9v) end";

    #[tokio::test]
    async fn test_duplicate_same_length_is_skipped() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", NOTE)
                .with_file("cat.png", b"xyz"),
        );
        let uc = ExportBase64UseCase::new(vault.clone());

        let result = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.converted, 0);
        assert!(!result.modified);
        assert_eq!(vault.binary_writes(), 0);
        assert_eq!(vault.text("n.md").await, NOTE);
    }

    #[tokio::test]
    async fn test_different_length_is_written_alongside() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", NOTE)
                .with_file("cat.png", b"longer"),
        );
        let uc = ExportBase64UseCase::new(vault.clone());

        let result = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap();

        assert_eq!(result.converted, 1);
        assert_eq!(vault.binary_writes(), 1);
        assert_eq!(vault.bytes("cat 1.png").await.unwrap(), b"foo");
        assert_eq!(vault.bytes("cat.png").await.unwrap(), b"longer");
        assert_eq!(vault.text("n.md").await, "see ![[cat 1.png]] end");
    }

    #[tokio::test]
    async fn test_hash_name_without_alt() {
        let vault = Arc::new(
            MemoryVault::new().with_note("dir/n.md", "![](data:image/jpeg;base64,Zm9v)"),
        );
        let uc = ExportBase64UseCase::new(vault.clone());

        uc.convert_document(Path::new("dir/n.md"), &ConversionFilters::none())
            .await
            .unwrap();

        let text = vault.text("dir/n.md").await;
        assert!(text.starts_with("![[dir/image-"), "{text}");
        assert!(text.ends_with(".jpg]]"), "{text}");
    }

    #[tokio::test]
    async fn test_malformed_payload_counts_failed_and_continues() {
        let vault = Arc::new(MemoryVault::new().with_note(
            "n.md",
            "![a.png](data:image/png;base64,@@@@) ![b.png](data:image/png;base64,Zm9v)",
        ));
        let uc = ExportBase64UseCase::new(vault.clone());

        let result = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap();

        assert_eq!(result.failed, 1);
        assert_eq!(result.converted, 1);
        assert_eq!(
            vault.text("n.md").await,
            "![a.png](data:image/png;base64,@@@@) ![[b.png]]"
        );
    }

    #[tokio::test]
    async fn test_same_payload_twice_in_one_document() {
        let vault = Arc::new(MemoryVault::new().with_note(
            "n.md",
            "![p.png](data:image/png;base64,Zm9v)\n![p.png](data:image/png;base64,Zm9v)",
        ));
        let uc = ExportBase64UseCase::new(vault.clone());

        let result = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap();

        assert_eq!(result.converted, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(vault.binary_writes(), 1);
        assert_eq!(
            vault.text("n.md").await,
            "![[p.png]]\n![p.png](data:image/png;base64,Zm9v)"
        );
    }

    #[test]
    fn test_attachment_name() {
        let buffer = ImageBuffer::new(b"foo".to_vec(), "image.png").with_mime("image/png");
        assert_eq!(attachment_name("shot.PNG", &buffer), "shot.PNG");
        assert_eq!(attachment_name("a/b/shot.jpg", &buffer), "shot.jpg");

        let hashed = attachment_name("my picture", &buffer);
        assert_eq!(hashed, attachment_name("", &buffer));
        assert!(hashed.starts_with("image-"));
        assert_eq!(hashed.len(), "image-".len() + HASH_PREFIX_BYTES * 2 + ".png".len());
    }
}

//! Embed to base64 use case implementation.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{ConversionFilters, ResizePolicy};
use crate::application::services::{
    AltTextCounter, Base64Codec, ImagePreparer, LinkFilter, LinkMatcher, Replacement, ScanOptions,
};
use crate::domain::entities::{ConversionResult, ImageSource, LinkKind, LinkMatch, file_name_of};
use crate::domain::errors::ConversionError;
use crate::domain::ports::VaultPort;

/// Inlines `![[image]]` embeds, and optionally remote images, as data URIs.
#[derive(Clone)]
pub struct EmbedToBase64UseCase {
    vault: Arc<dyn VaultPort>,
    preparer: ImagePreparer,
    resize: ResizePolicy,
}

impl EmbedToBase64UseCase {
    /// Creates new embed use case.
    #[must_use]
    pub const fn new(vault: Arc<dyn VaultPort>, preparer: ImagePreparer, resize: ResizePolicy) -> Self {
        Self {
            vault,
            preparer,
            resize,
        }
    }

    /// Converts every eligible link in one document.
    ///
    /// The document is written back only when its text changed.
    ///
    /// # Errors
    /// Returns error if the document cannot be read or written. Link-level
    /// problems are counted in the result instead.
    pub async fn convert_document(
        &self,
        path: &Path,
        filters: &ConversionFilters,
    ) -> Result<ConversionResult, ConversionError> {
        let text = self.vault.read_text(path).await?;
        let mut counter = AltTextCounter::new();
        let (output, mut result) = self.convert_text(&text, path, filters, &mut counter).await;

        if output != text {
            self.vault.write_text(path, &output).await?;
            result.modified = true;
            info!(
                document = %path.display(),
                converted = result.converted,
                "Embedded images as base64"
            );
        }

        Ok(result)
    }

    /// Rewrites `text` as seen from the note at `from`, without touching storage.
    pub async fn convert_text(
        &self,
        text: &str,
        from: &Path,
        filters: &ConversionFilters,
        counter: &mut AltTextCounter,
    ) -> (String, ConversionResult) {
        let options = ScanOptions {
            include_remote: filters.include_remote,
        };
        let links = LinkMatcher::find_links(text, options);
        let filter = LinkFilter::new(filters);
        let mut result = ConversionResult::new(from);
        let mut replacements = Vec::new();

        for link in links.iter().filter(|l| l.kind != LinkKind::Base64) {
            if filter.should_skip(link) {
                result.skipped += 1;
                continue;
            }

            match self.convert_link(link, from, counter).await {
                Ok(markdown) => {
                    replacements.push(Replacement::for_link(link, markdown));
                    result.converted += 1;
                }
                Err(e) if e.counts_as_skip() => {
                    debug!(link = %link.reference, error = %e, "Skipping link");
                    result.skipped += 1;
                }
                Err(e) => {
                    warn!(link = %link.reference, error = %e, "Failed to embed image");
                    result.failed += 1;
                }
            }
        }

        if replacements.is_empty() {
            return (text.to_string(), result);
        }
        (LinkMatcher::splice(text, replacements), result)
    }

    /// Produces the base64 markdown link replacing one embed or remote link.
    ///
    /// The alt text is the referenced file name, or the existing alt text of
    /// a remote link.
    ///
    /// # Errors
    /// Returns error if the image cannot be resolved, fetched, or resized.
    pub async fn convert_link(
        &self,
        link: &LinkMatch,
        from: &Path,
        counter: &mut AltTextCounter,
    ) -> Result<String, ConversionError> {
        let source = match link.kind {
            LinkKind::Embed => ImageSource::Path(link.reference.clone().into()),
            LinkKind::Remote => ImageSource::Url(link.reference.clone()),
            LinkKind::Base64 => {
                return Err(ConversionError::malformed("link is already inline"));
            }
        };

        let buffer = self.preparer.prepare(&source, from, &self.resize).await?;
        let alt = if link.alt.trim().is_empty() {
            file_name_of(&link.reference)
        } else {
            link.alt.as_str()
        };

        Ok(Base64Codec::to_markdown_link(&buffer, Some(alt), counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::{FixedScaler, MemoryVault, MockRemoteFetchPort};
    use bytes::Bytes;

    fn use_case(vault: Arc<MemoryVault>, fetcher: MockRemoteFetchPort) -> EmbedToBase64UseCase {
        let preparer = ImagePreparer::new(
            vault.clone(),
            Arc::new(fetcher),
            Arc::new(FixedScaler::new(10, 10)),
        );
        EmbedToBase64UseCase::new(vault, preparer, ResizePolicy::disabled())
    }

    #[tokio::test]
    async fn test_converts_embed_with_file_name_alt() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", "before ![[img/a.png]] after")
                .with_file("img/a.png", b"foo"),
        );
        let uc = use_case(vault.clone(), MockRemoteFetchPort::new());

        let result = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap();

        assert!(result.modified);
        assert_eq!(result.converted, 1);
        assert_eq!(
            vault.text("n.md").await,
            "before ![a.png](data:image/png;base64,Zm9v) after"
        );
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", "![[a.png]] ![[a.png]]")
                .with_file("a.png", b"foo"),
        );
        let uc = use_case(vault.clone(), MockRemoteFetchPort::new());
        let filters = ConversionFilters::none();

        let first = uc.convert_document(Path::new("n.md"), &filters).await.unwrap();
        assert_eq!(first.converted, 2);
        let after_first = vault.text("n.md").await;

        let second = uc.convert_document(Path::new("n.md"), &filters).await.unwrap();
        assert!(!second.modified);
        assert!(!second.touched());
        assert_eq!(vault.text("n.md").await, after_first);
        assert_eq!(vault.text_writes(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_embed_is_skipped_and_untouched() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", "![[missing.png]]"));
        let uc = use_case(vault.clone(), MockRemoteFetchPort::new());

        let result = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap();

        assert_eq!(result.skipped, 1);
        assert!(!result.modified);
        assert_eq!(vault.text_writes(), 0);
        assert_eq!(vault.text("n.md").await, "![[missing.png]]");
    }

    #[tokio::test]
    async fn test_remote_links_only_when_included() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", "![cat](https://h/cat.png)"));
        let mut fetcher = MockRemoteFetchPort::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"foo")));
        let uc = use_case(vault.clone(), fetcher);

        let skipped = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap();
        assert!(!skipped.touched());

        let converted = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none().with_remote())
            .await
            .unwrap();
        assert_eq!(converted.converted, 1);
        assert_eq!(
            vault.text("n.md").await,
            "![cat](data:image/png;base64,Zm9v)"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_counts_failed() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", "![x](https://h/x.png) ![[a.png]]")
                .with_file("a.png", b"foo"),
        );
        let mut fetcher = MockRemoteFetchPort::new();
        fetcher
            .expect_fetch()
            .returning(|url| Err(ConversionError::fetch(url, "timed out")));
        let uc = use_case(vault.clone(), fetcher);

        let result = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none().with_remote())
            .await
            .unwrap();

        assert_eq!(result.failed, 1);
        assert_eq!(result.converted, 1);
        assert_eq!(
            vault.text("n.md").await,
            "![x](https://h/x.png) ![a.png](data:image/png;base64,Zm9v)"
        );
    }

    #[tokio::test]
    async fn test_filtered_links_are_skipped() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", "![[temp1.png]] ![[keep.png]]")
                .with_file("temp1.png", b"a")
                .with_file("keep.png", b"b"),
        );
        let uc = use_case(vault.clone(), MockRemoteFetchPort::new());

        let result = uc
            .convert_document(
                Path::new("n.md"),
                &ConversionFilters::none().with_filter("temp*"),
            )
            .await
            .unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.converted, 1);
        assert!(vault.text("n.md").await.starts_with("![[temp1.png]] ![keep.png]"));
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", "![[a.png]]")
                .with_file("a.png", b"foo")
                .failing_writes_to("n.md"),
        );
        let uc = use_case(vault, MockRemoteFetchPort::new());

        let err = uc
            .convert_document(Path::new("n.md"), &ConversionFilters::none())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::StorageWriteFailure { .. }));
    }
}

//! Single-link conversion at a cursor position.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::dto::LinkConversion;
use crate::application::services::{AltTextCounter, LinkMatcher, Replacement, ScanOptions};
use crate::domain::entities::LinkKind;
use crate::domain::errors::ConversionError;
use crate::domain::ports::{NotificationPort, VaultPort};

use super::{EmbedToBase64UseCase, ExportBase64UseCase, ExportOutcome};

/// Converts the one link under a cursor, in whichever direction applies.
#[derive(Clone)]
pub struct ConvertLinkUseCase {
    vault: Arc<dyn VaultPort>,
    embed: EmbedToBase64UseCase,
    export: ExportBase64UseCase,
    notifier: Arc<dyn NotificationPort>,
}

impl ConvertLinkUseCase {
    /// Creates new link use case.
    #[must_use]
    pub const fn new(
        vault: Arc<dyn VaultPort>,
        embed: EmbedToBase64UseCase,
        export: ExportBase64UseCase,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            vault,
            embed,
            export,
            notifier,
        }
    }

    /// Converts the link at byte `offset` of `note` and saves the note.
    ///
    /// Embeds and remote links become base64; base64 links become
    /// attachments. A base64 image already stored under the same name and
    /// size is linked to instead of written again. Failures are also shown
    /// as a notice.
    ///
    /// # Errors
    /// Returns `NoLinkAtCursor` when no image link covers `offset`, or the
    /// error that stopped the conversion.
    pub async fn execute(&self, note: &Path, offset: usize) -> Result<LinkConversion, ConversionError> {
        match self.convert(note, offset).await {
            Ok(conversion) => {
                info!(document = %note.display(), offset, "Converted link at cursor");
                Ok(conversion)
            }
            Err(e) => {
                warn!(document = %note.display(), offset, error = %e, "Link conversion failed");
                self.notifier
                    .send(crate::NAME, &format!("Failed to convert image: {e}"));
                Err(e)
            }
        }
    }

    async fn convert(&self, note: &Path, offset: usize) -> Result<LinkConversion, ConversionError> {
        let text = self.vault.read_text(note).await?;
        let link = LinkMatcher::link_at(&text, offset, ScanOptions::with_remote())
            .ok_or(ConversionError::NoLinkAtCursor { offset })?;

        let conversion = match link.kind {
            LinkKind::Embed | LinkKind::Remote => {
                let mut counter = AltTextCounter::new();
                LinkConversion {
                    replacement: self.embed.convert_link(&link, note, &mut counter).await?,
                    attachment: None,
                }
            }
            LinkKind::Base64 => match self.export.export_link(&link, note).await? {
                ExportOutcome::Written { path, link } => LinkConversion {
                    replacement: link,
                    attachment: Some(path),
                },
                ExportOutcome::Duplicate { path } => LinkConversion {
                    replacement: self.export.link_to(&path, note),
                    attachment: Some(path),
                },
            },
        };

        let output = LinkMatcher::splice(
            &text,
            vec![Replacement::for_link(&link, conversion.replacement.clone())],
        );
        self.vault.write_text(note, &output).await?;
        Ok(conversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::ResizePolicy;
    use crate::application::services::ImagePreparer;
    use crate::domain::ports::mocks::{
        FixedScaler, MemoryVault, MockNotificationPort, MockRemoteFetchPort,
    };
    use std::path::PathBuf;

    fn use_case(
        vault: Arc<MemoryVault>,
        fetcher: MockRemoteFetchPort,
        notifier: Arc<MockNotificationPort>,
    ) -> ConvertLinkUseCase {
        let preparer = ImagePreparer::new(
            vault.clone(),
            Arc::new(fetcher),
            Arc::new(FixedScaler::new(10, 10)),
        );
        let embed = EmbedToBase64UseCase::new(vault.clone(), preparer, ResizePolicy::disabled());
        let export = ExportBase64UseCase::new(vault.clone());
        ConvertLinkUseCase::new(vault, embed, export, notifier)
    }

    #[tokio::test]
    async fn test_converts_only_link_under_cursor() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", "![[a.png]] ![[a.png]]")
                .with_file("a.png", b"foo"),
        );
        let uc = use_case(
            vault.clone(),
            MockRemoteFetchPort::new(),
            Arc::new(MockNotificationPort::new()),
        );

        uc.execute(Path::new("n.md"), 13).await.unwrap();

        assert_eq!(
            vault.text("n.md").await,
            "![[a.png]] ![a.png](data:image/png;base64,Zm9v)"
        );
    }

    #[tokio::test]
    async fn test_exports_base64_under_cursor() {
        let vault = Arc::new(
            MemoryVault::new().with_note("n.md", "![c.png](data:image/png;base64,Zm9v)"),
        );
        let uc = use_case(
            vault.clone(),
            MockRemoteFetchPort::new(),
            Arc::new(MockNotificationPort::new()),
        );

        let conversion = uc.execute(Path::new("n.md"), 3).await.unwrap();

        assert_eq!(conversion.attachment, Some(PathBuf::from("c.png")));
        assert_eq!(vault.text("n.md").await, "![[c.png]]");
        assert_eq!(vault.bytes("c.png").await.unwrap(), b"foo");
    }

    #[tokio::test]
    async fn test_duplicate_links_existing_attachment() {
        let vault = Arc::new(
            MemoryVault::new()
                .with_note("n.md", "![c.png](data:image/png;base64,Zm9v)")
                .with_file("c.png", b"bar"),
        );
        let uc = use_case(
            vault.clone(),
            MockRemoteFetchPort::new(),
            Arc::new(MockNotificationPort::new()),
        );

        uc.execute(Path::new("n.md"), 0).await.unwrap();

        assert_eq!(vault.binary_writes(), 0);
        assert_eq!(vault.text("n.md").await, "![[c.png]]");
    }

    #[tokio::test]
    async fn test_no_link_at_cursor() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", "just text ![[a.png]]"));
        let notifier = Arc::new(MockNotificationPort::new());
        let uc = use_case(vault, MockRemoteFetchPort::new(), notifier.clone());

        let err = uc.execute(Path::new("n.md"), 2).await.unwrap_err();
        assert!(matches!(err, ConversionError::NoLinkAtCursor { offset: 2 }));
        assert_eq!(notifier.bodies().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_fetch_failure_is_notified() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", "![x](https://h/x.png)"));
        let mut fetcher = MockRemoteFetchPort::new();
        fetcher
            .expect_fetch()
            .returning(|url| Err(ConversionError::fetch(url, "404 Not Found")));
        let notifier = Arc::new(MockNotificationPort::new());
        let uc = use_case(vault.clone(), fetcher, notifier.clone());

        let err = uc.execute(Path::new("n.md"), 5).await.unwrap_err();

        assert!(matches!(err, ConversionError::RemoteFetchFailure { .. }));
        assert!(notifier.bodies()[0].contains("404 Not Found"));
        assert_eq!(vault.text_writes(), 0);
    }
}

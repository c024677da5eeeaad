//! Paste and drop handling.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::dto::{
    InsertMode, InsertOutcome, InsertRequest, InsertSettings, ResizePolicy,
};
use crate::application::services::{
    AltTextCounter, Base64Codec, ImagePreparer, LinkMatcher, Replacement,
};
use crate::domain::entities::DEFAULT_IMAGE_NAME;
use crate::domain::errors::ConversionError;
use crate::domain::ports::VaultPort;
use crate::domain::services::ResizeRuleEngine;

/// Inserts a pasted or dropped image into a note as an inline data URI.
#[derive(Clone)]
pub struct InsertImageUseCase {
    vault: Arc<dyn VaultPort>,
    preparer: ImagePreparer,
    resize: ResizePolicy,
    settings: InsertSettings,
}

impl InsertImageUseCase {
    /// Creates new insert use case.
    #[must_use]
    pub const fn new(
        vault: Arc<dyn VaultPort>,
        preparer: ImagePreparer,
        resize: ResizePolicy,
        settings: InsertSettings,
    ) -> Self {
        Self {
            vault,
            preparer,
            resize,
            settings,
        }
    }

    /// Inserts the image of `request` into its note.
    ///
    /// Returns [`InsertOutcome::Disabled`] when conversion is off for the
    /// request mode and [`InsertOutcome::Skipped`] when the size gate
    /// rejects the image. In both cases the note is left as is.
    ///
    /// # Errors
    /// Returns error if the image cannot be loaded or resized, or the note
    /// cannot be read or written.
    pub async fn execute(&self, request: InsertRequest) -> Result<InsertOutcome, ConversionError> {
        if !self.settings.converts(request.mode) {
            debug!(mode = %request.mode, "Conversion disabled for this mode");
            return Ok(InsertOutcome::Disabled);
        }

        let buffer = self.preparer.resolve(&request.source, &request.note).await?;

        let threshold = self.settings.threshold;
        if threshold.enabled
            && ResizeRuleEngine::should_skip_conversion(
                &buffer,
                threshold.value_kb,
                threshold.trigger_when_larger,
            )
        {
            let size_kb = (buffer.size() / 1024) as u64;
            info!(size_kb, threshold_kb = threshold.value_kb, "Image outside threshold, not converting");
            return Ok(InsertOutcome::Skipped { size_kb });
        }

        let buffer = self.preparer.resize(buffer, &self.resize).await?;

        let alt = match request.mode {
            InsertMode::Paste if buffer.filename() != DEFAULT_IMAGE_NAME => {
                Some(buffer.filename().to_string())
            }
            InsertMode::Paste | InsertMode::Drop => None,
        };
        let mut counter = AltTextCounter::new();
        let mut markdown = Base64Codec::to_markdown_link(&buffer, alt.as_deref(), &mut counter);
        markdown.push('\n');

        let text = self.vault.read_text(&request.note).await?;
        let at = request
            .offset
            .filter(|&o| o <= text.len() && text.is_char_boundary(o))
            .unwrap_or(text.len());
        let output = LinkMatcher::splice(
            &text,
            vec![Replacement {
                span: at..at,
                text: markdown.clone(),
            }],
        );
        self.vault.write_text(&request.note, &output).await?;

        info!(
            note = %request.note.display(),
            mode = %request.mode,
            bytes = buffer.size(),
            "Inserted image as base64"
        );
        Ok(InsertOutcome::Inserted { text: markdown })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::ThresholdPolicy;
    use crate::domain::entities::{ImageSource, ResizeRule};
    use crate::domain::ports::mocks::{FixedScaler, MemoryVault, MockRemoteFetchPort};
    use bytes::Bytes;

    fn use_case(
        vault: Arc<MemoryVault>,
        resize: ResizePolicy,
        settings: InsertSettings,
    ) -> InsertImageUseCase {
        let preparer = ImagePreparer::new(
            vault.clone(),
            Arc::new(MockRemoteFetchPort::new()),
            Arc::new(FixedScaler::new(2000, 2000)),
        );
        InsertImageUseCase::new(vault, preparer, resize, settings)
    }

    fn pasted(bytes: &'static [u8], filename: &str) -> ImageSource {
        ImageSource::RawBytes {
            bytes: Bytes::from_static(bytes),
            filename: filename.to_string(),
        }
    }

    #[tokio::test]
    async fn test_paste_appends_link_with_counter_alt() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", "top\n"));
        let uc = use_case(vault.clone(), ResizePolicy::disabled(), InsertSettings::default());

        let outcome = uc
            .execute(InsertRequest::new("n.md", pasted(b"foo", ""), InsertMode::Paste))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            InsertOutcome::Inserted {
                text: "![image0](data:image/png;base64,Zm9v)\n".into()
            }
        );
        assert_eq!(
            vault.text("n.md").await,
            "top\n![image0](data:image/png;base64,Zm9v)\n"
        );
    }

    #[tokio::test]
    async fn test_paste_keeps_file_name_alt() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", ""));
        let uc = use_case(vault.clone(), ResizePolicy::disabled(), InsertSettings::default());

        uc.execute(InsertRequest::new("n.md", pasted(b"foo", "shot.png"), InsertMode::Paste))
            .await
            .unwrap();

        assert_eq!(
            vault.text("n.md").await,
            "![shot.png](data:image/png;base64,Zm9v)\n"
        );
    }

    #[tokio::test]
    async fn test_drop_uses_counter_alt_and_newline_at_offset() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", "ab"));
        let uc = use_case(vault.clone(), ResizePolicy::disabled(), InsertSettings::default());

        uc.execute(
            InsertRequest::new("n.md", pasted(b"foo", "shot.png"), InsertMode::Drop).at_offset(1),
        )
        .await
        .unwrap();

        assert_eq!(
            vault.text("n.md").await,
            "a![image0](data:image/png;base64,Zm9v)\nb"
        );
    }

    #[tokio::test]
    async fn test_disabled_mode_leaves_note() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", ""));
        let settings = InsertSettings {
            convert_on_drop: false,
            ..InsertSettings::default()
        };
        let uc = use_case(vault.clone(), ResizePolicy::disabled(), settings);

        let outcome = uc
            .execute(InsertRequest::new("n.md", pasted(b"foo", "a.png"), InsertMode::Drop))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Disabled);
        assert_eq!(vault.text_writes(), 0);
    }

    #[tokio::test]
    async fn test_threshold_skips_large_image() {
        static BIG: [u8; 4096] = [0; 4096];
        let vault = Arc::new(MemoryVault::new().with_note("n.md", ""));
        let settings = InsertSettings {
            threshold: ThresholdPolicy {
                enabled: true,
                value_kb: 2.0,
                trigger_when_larger: true,
            },
            ..InsertSettings::default()
        };
        let uc = use_case(vault.clone(), ResizePolicy::disabled(), settings);

        let outcome = uc
            .execute(InsertRequest::new("n.md", pasted(&BIG, "big.png"), InsertMode::Paste))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Skipped { size_kb: 4 });
        assert_eq!(vault.text_writes(), 0);
    }

    #[tokio::test]
    async fn test_resize_applies_before_encoding() {
        let vault = Arc::new(MemoryVault::new().with_note("n.md", ""));
        let resize = ResizePolicy::with_rules(vec![ResizeRule::new("1920x1080", 50)]);
        let uc = use_case(vault.clone(), resize, InsertSettings::default());

        uc.execute(InsertRequest::new("n.md", pasted(b"abcd", "a.jpg"), InsertMode::Paste))
            .await
            .unwrap();

        assert_eq!(
            vault.text("n.md").await,
            "![a.jpg](data:image/png;base64,YWI=)\n"
        );
    }
}

//! Turns an [`ImageSource`] into the buffer that gets embedded.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::dto::ResizePolicy;
use crate::domain::entities::{ImageBuffer, ImageSource, file_name_of};
use crate::domain::errors::ConversionError;
use crate::domain::ports::{ImageScalerPort, RemoteFetchPort, VaultPort};
use crate::domain::services::{FULL_SCALE, ResizeRuleEngine};

/// Resolves image sources and applies the resize policy.
#[derive(Clone)]
pub struct ImagePreparer {
    vault: Arc<dyn VaultPort>,
    fetcher: Arc<dyn RemoteFetchPort>,
    scaler: Arc<dyn ImageScalerPort>,
}

impl ImagePreparer {
    /// Creates a preparer over the given ports.
    #[must_use]
    pub fn new(
        vault: Arc<dyn VaultPort>,
        fetcher: Arc<dyn RemoteFetchPort>,
        scaler: Arc<dyn ImageScalerPort>,
    ) -> Self {
        Self {
            vault,
            fetcher,
            scaler,
        }
    }

    /// Loads the bytes behind `source`.
    ///
    /// Paths are embed references resolved relative to the note at `from`.
    ///
    /// # Errors
    /// Returns `UnresolvedReference` for paths the vault does not know,
    /// `RemoteFetchFailure` for failed downloads, or a storage error.
    pub async fn resolve(
        &self,
        source: &ImageSource,
        from: &Path,
    ) -> Result<ImageBuffer, ConversionError> {
        debug!(source = source.kind(), note = %from.display(), "Resolving image");
        match source {
            ImageSource::Path(reference) => {
                let reference = reference.to_string_lossy();
                let path = self
                    .vault
                    .resolve_link(&reference, from)
                    .await
                    .ok_or_else(|| ConversionError::unresolved(reference.as_ref()))?;
                let bytes = self.vault.read_binary(&path).await?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(ImageBuffer::new(bytes, filename))
            }
            ImageSource::Url(url) => {
                let bytes = self.fetcher.fetch(url).await?;
                Ok(ImageBuffer::new(bytes, file_name_of(url)))
            }
            ImageSource::RawBytes { bytes, filename } => {
                Ok(ImageBuffer::new(bytes.clone(), filename.clone()))
            }
        }
    }

    /// Downscales `buffer` according to `policy`.
    ///
    /// Images whose dimensions cannot be read are kept at full scale.
    ///
    /// # Errors
    /// Returns `Scaling` if the scaler fails on an image it could measure.
    pub async fn resize(
        &self,
        buffer: ImageBuffer,
        policy: &ResizePolicy,
    ) -> Result<ImageBuffer, ConversionError> {
        if !policy.is_active() || buffer.is_empty() {
            return Ok(buffer);
        }

        let dimensions = match self.scaler.decode_dimensions(buffer.bytes()).await {
            Ok(dimensions) => dimensions,
            Err(e) => {
                warn!(file = %buffer.filename(), error = %e, "Cannot read image dimensions, keeping full scale");
                return Ok(buffer);
            }
        };

        let percentage = ResizeRuleEngine::resolve_scale(&buffer, dimensions, &policy.rules);
        if percentage >= FULL_SCALE {
            return Ok(buffer);
        }

        let scaled = self.scaler.scale(buffer.bytes(), percentage).await?;
        debug!(
            file = %buffer.filename(),
            %dimensions,
            percentage,
            before = buffer.size(),
            after = scaled.len(),
            "Resized image"
        );
        Ok(buffer.with_bytes(scaled).with_mime("image/png"))
    }

    /// Resolves and resizes in one step.
    ///
    /// # Errors
    /// Propagates errors from [`ImagePreparer::resolve`] and
    /// [`ImagePreparer::resize`].
    pub async fn prepare(
        &self,
        source: &ImageSource,
        from: &Path,
        policy: &ResizePolicy,
    ) -> Result<ImageBuffer, ConversionError> {
        let buffer = self.resolve(source, from).await?;
        self.resize(buffer, policy).await
    }
}

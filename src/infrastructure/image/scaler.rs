//! Pixel scaling backed by the `image` crate.

use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::{GenericImageView, ImageFormat, imageops::FilterType};
use tracing::{debug, error};

use crate::domain::entities::Dimensions;
use crate::domain::errors::ConversionError;
use crate::domain::ports::ImageScalerPort;
use crate::domain::services::{FULL_SCALE, ResizeRuleEngine};

/// Decodes and rescales images off the async runtime.
#[derive(Debug, Clone, Copy)]
pub struct ImageCrateScaler {
    filter: FilterType,
}

impl ImageCrateScaler {
    /// Creates a scaler using Lanczos resampling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Uses `filter` for resampling.
    #[must_use]
    pub const fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for ImageCrateScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageScalerPort for ImageCrateScaler {
    async fn decode_dimensions(&self, bytes: &Bytes) -> Result<Dimensions, ConversionError> {
        let bytes = bytes.clone();
        tokio::task::spawn_blocking(move || {
            image::ImageReader::new(Cursor::new(&bytes[..]))
                .with_guessed_format()
                .map_err(|e| ConversionError::scaling(e.to_string()))?
                .into_dimensions()
                .map(|(width, height)| Dimensions::new(width, height))
                .map_err(|e| ConversionError::scaling(e.to_string()))
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Dimension task panicked");
            ConversionError::scaling(e.to_string())
        })?
    }

    async fn scale(&self, bytes: &Bytes, percentage: u32) -> Result<Bytes, ConversionError> {
        let bytes = bytes.clone();
        let filter = self.filter;

        let scaled = tokio::task::spawn_blocking(move || scale_blocking(&bytes, percentage, filter))
            .await
            .map_err(|e| {
                error!(error = %e, "Scaling task panicked");
                ConversionError::scaling(e.to_string())
            })??;

        debug!(percentage, bytes = scaled.len(), "Scaled image");
        Ok(scaled)
    }
}

fn scale_blocking(bytes: &[u8], percentage: u32, filter: FilterType) -> Result<Bytes, ConversionError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| ConversionError::scaling(e.to_string()))?;

    let (width, height) = decoded.dimensions();
    let resized = if percentage >= FULL_SCALE {
        decoded
    } else {
        let target = ResizeRuleEngine::scaled_dimensions(Dimensions::new(width, height), percentage);
        decoded.resize_exact(target.width, target.height, filter)
    };

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ConversionError::scaling(e.to_string()))?;
    Ok(Bytes::from(out.into_inner()))
}

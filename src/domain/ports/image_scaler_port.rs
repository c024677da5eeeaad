//! Port definition for image decoding and scaling.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::entities::Dimensions;
use crate::domain::errors::ConversionError;

/// Port for the pixel-level image codec.
#[async_trait]
pub trait ImageScalerPort: Send + Sync {
    /// Reads the pixel dimensions of an encoded image.
    async fn decode_dimensions(&self, bytes: &Bytes) -> Result<Dimensions, ConversionError>;

    /// Scales an encoded image by `percentage` and re-encodes it as PNG.
    async fn scale(&self, bytes: &Bytes, percentage: u32) -> Result<Bytes, ConversionError>;
}

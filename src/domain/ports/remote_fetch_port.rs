//! Port definition for downloading remote images.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::ConversionError;

/// Port for fetching image bytes over the network.
///
/// Implementations make a single attempt; callers treat failures as
/// non-fatal for the surrounding run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteFetchPort: Send + Sync {
    /// Downloads the image at `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, ConversionError>;
}

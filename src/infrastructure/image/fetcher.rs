//! HTTP download of remote images.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use tracing::{debug, warn};

use crate::domain::errors::ConversionError;
use crate::domain::ports::RemoteFetchPort;

const USER_AGENT: &str = concat!("vault64/", env!("CARGO_PKG_VERSION"));

/// Fetches remote images with a single GET per call.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher whose requests give up after `timeout_secs`.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(timeout_secs: u64) -> Result<Self, ConversionError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConversionError::fetch("", format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ConversionError> {
        debug!(%url, "Fetching remote image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConversionError::fetch(url, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Remote image request rejected");
            return Err(ConversionError::fetch(
                url,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConversionError::fetch(url, format!("failed to read body: {e}")))?;

        if !looks_like_image(content_type.as_deref(), &bytes) {
            return Err(ConversionError::fetch(
                url,
                format!(
                    "not an image ({})",
                    content_type.as_deref().unwrap_or("no content type")
                ),
            ));
        }

        debug!(%url, bytes = bytes.len(), "Fetched remote image");
        Ok(bytes)
    }
}

/// Accepts `image/*` responses, and anything else whose bytes sniff as an image.
fn looks_like_image(content_type: Option<&str>, bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let declared_image = content_type.is_some_and(|ct| {
        ct.trim_start().to_ascii_lowercase().starts_with("image/")
    });
    declared_image || image::guess_format(bytes).is_ok()
}

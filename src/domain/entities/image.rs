//! Image payload types shared by every conversion path.

use std::path::PathBuf;

use bytes::Bytes;

/// Fallback filename for buffers with no known origin.
pub const DEFAULT_IMAGE_NAME: &str = "image";

/// Raw image bytes held for the duration of one conversion.
///
/// Buffers are never mutated in place. Resizing or re-encoding produces a new
/// buffer through [`ImageBuffer::with_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    bytes: Bytes,
    filename: String,
    mime: Option<String>,
}

impl ImageBuffer {
    /// Creates a buffer from bytes and a filename.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            bytes: bytes.into(),
            filename: if filename.is_empty() {
                DEFAULT_IMAGE_NAME.to_string()
            } else {
                filename
            },
            mime: None,
        }
    }

    /// Attaches a declared MIME type (e.g. from a data URI or HTTP header).
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Returns a new buffer carrying `bytes` and the same filename.
    ///
    /// The declared MIME type is dropped because the new bytes may use a
    /// different encoding.
    #[must_use]
    pub fn with_bytes(&self, bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: self.filename.clone(),
            mime: None,
        }
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the declared MIME type, if any.
    #[must_use]
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size in kilobytes (1 KB = 1024 bytes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    /// Returns true when the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Creates new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Where an image comes from before it is turned into an [`ImageBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// File inside the vault.
    Path(PathBuf),
    /// Remote `http(s)` address.
    Url(String),
    /// Bytes already in memory (clipboard, drag and drop).
    RawBytes {
        /// Image bytes.
        bytes: Bytes,
        /// Original filename, empty when unknown.
        filename: String,
    },
}

impl ImageSource {
    /// Short label used in log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Url(_) => "url",
            Self::RawBytes { .. } => "bytes",
        }
    }
}

/// Returns the final path component of a vault path or URL, without query.
#[must_use]
pub fn file_name_of(reference: &str) -> &str {
    let without_query = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference);
    without_query
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_IMAGE_NAME)
}

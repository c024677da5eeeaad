//! Encoding between image bytes and markdown data-URI links.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use image::ImageFormat;

use crate::domain::entities::ImageBuffer;
use crate::domain::errors::ConversionError;

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";
const FALLBACK_MIME: &str = "image/png";

/// Standard alphabet that accepts payloads with or without padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Produces `image0`, `image1`, ... for links without alt text.
///
/// One counter is owned by one run, which keeps output deterministic.
#[derive(Debug, Clone, Default)]
pub struct AltTextCounter {
    next: usize,
}

impl AltTextCounter {
    /// Creates a counter starting at `image0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns the next alt text and advances.
    pub fn next_alt(&mut self) -> String {
        let alt = format!("image{}", self.next);
        self.next += 1;
        alt
    }
}

/// Data URI encoder and decoder for image buffers.
pub struct Base64Codec;

impl Base64Codec {
    /// Encodes a buffer as `data:<mime>;base64,<payload>`.
    ///
    /// The payload uses the standard alphabet with padding and no line breaks.
    #[must_use]
    pub fn encode(buffer: &ImageBuffer) -> String {
        format!(
            "data:{};base64,{}",
            Self::mime_of(buffer),
            STANDARD.encode(buffer.bytes())
        )
    }

    /// Decodes a `data:image/<subtype>;base64,<payload>` URI.
    ///
    /// # Errors
    /// Returns `MalformedDataUri` when the prefix, subtype, or payload is invalid.
    pub fn decode(data_uri: &str) -> Result<ImageBuffer, ConversionError> {
        let rest = data_uri
            .trim()
            .strip_prefix(DATA_URI_PREFIX)
            .ok_or_else(|| ConversionError::malformed("expected a data:image/ prefix"))?;

        let (subtype, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or_else(|| ConversionError::malformed("missing ;base64, marker"))?;

        if subtype.is_empty()
            || !subtype
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(ConversionError::malformed(format!(
                "invalid image subtype `{subtype}`"
            )));
        }

        if payload.is_empty() {
            return Err(ConversionError::malformed("empty payload"));
        }

        let bytes = LENIENT
            .decode(payload)
            .map_err(|e| ConversionError::malformed(format!("invalid base64 payload: {e}")))?;

        let mime = format!("image/{}", subtype.to_ascii_lowercase());
        let filename = format!("image.{}", Self::extension_for_mime(&mime));
        Ok(ImageBuffer::new(bytes, filename).with_mime(mime))
    }

    /// Wraps the encoded buffer as `![<alt>](<data URI>)`.
    ///
    /// Missing or blank alt text takes the next value of `counter`.
    #[must_use]
    pub fn to_markdown_link(
        buffer: &ImageBuffer,
        alt: Option<&str>,
        counter: &mut AltTextCounter,
    ) -> String {
        let alt = alt
            .map(sanitize_alt)
            .filter(|alt| !alt.trim().is_empty())
            .unwrap_or_else(|| counter.next_alt());
        format!("![{alt}]({})", Self::encode(buffer))
    }

    /// MIME type used when encoding a buffer.
    ///
    /// Declared type first, then the byte signature, then the filename
    /// extension, then `image/png`.
    #[must_use]
    pub fn mime_of(buffer: &ImageBuffer) -> String {
        if let Some(mime) = buffer.mime().filter(|m| m.starts_with("image/")) {
            return mime.to_string();
        }

        if let Ok(format) = image::guess_format(buffer.bytes()) {
            return format.to_mime_type().to_string();
        }

        Self::mime_for_filename(buffer.filename()).unwrap_or_else(|| FALLBACK_MIME.to_string())
    }

    /// MIME type implied by a filename extension.
    #[must_use]
    pub fn mime_for_filename(filename: &str) -> Option<String> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::mime_for_extension(ext)
    }

    /// MIME type for a bare extension such as `jpg`.
    #[must_use]
    pub fn mime_for_extension(ext: &str) -> Option<String> {
        ImageFormat::from_extension(ext).map(|f| f.to_mime_type().to_string())
    }

    /// File extension for an image MIME type, `png` when unknown.
    #[must_use]
    pub fn extension_for_mime(mime: &str) -> String {
        if let Some(ext) = ImageFormat::from_mime_type(mime)
            .and_then(|f| f.extensions_str().first().copied())
        {
            return ext.to_string();
        }

        mime.strip_prefix("image/")
            .and_then(|subtype| subtype.split(['+', ';']).next())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map_or_else(|| "png".to_string(), str::to_ascii_lowercase)
    }
}

fn sanitize_alt(alt: &str) -> String {
    alt.chars()
        .filter(|c| !matches!(c, '[' | ']' | '\n' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_round_trip_preserves_bytes() {
        for bytes in [vec![0u8], vec![1, 2], vec![255; 3], (0..=255).collect::<Vec<u8>>()] {
            let buffer = ImageBuffer::new(bytes.clone(), "x.png");
            let decoded = Base64Codec::decode(&Base64Codec::encode(&buffer)).unwrap();
            assert_eq!(decoded.bytes().as_ref(), bytes.as_slice());
            assert_eq!(decoded.size(), bytes.len());
        }
    }

    #[test]
    fn test_encode_padding_and_default_mime() {
        let buffer = ImageBuffer::new(b"foo!".to_vec(), "unknown");
        assert_eq!(Base64Codec::encode(&buffer), "data:image/png;base64,Zm9vIQ==");
    }

    #[test]
    fn test_mime_inference_order() {
        let declared = ImageBuffer::new(PNG_SIGNATURE.to_vec(), "a.jpg").with_mime("image/webp");
        assert_eq!(Base64Codec::mime_of(&declared), "image/webp");

        let sniffed = ImageBuffer::new(PNG_SIGNATURE.to_vec(), "a.jpg");
        assert_eq!(Base64Codec::mime_of(&sniffed), "image/png");

        let by_name = ImageBuffer::new(b"not an image".to_vec(), "photo.JPG");
        assert_eq!(Base64Codec::mime_of(&by_name), "image/jpeg");
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        for input in [
            "data:text/plain;base64,Zm9v",
            "data:image/png,Zm9v",
            "data:image/;base64,Zm9v",
            "data:image/png;base64,",
            "data:image/png;base64,@@@",
            "https://example.com/a.png",
        ] {
            assert!(
                matches!(
                    Base64Codec::decode(input),
                    Err(ConversionError::MalformedDataUri { .. })
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_accepts_missing_padding() {
        let buffer = Base64Codec::decode("data:image/jpeg;base64,Zm9vIQ").unwrap();
        assert_eq!(buffer.bytes().as_ref(), b"foo!");
        assert_eq!(buffer.mime(), Some("image/jpeg"));
        assert_eq!(buffer.filename(), "image.jpg");
    }

    #[test]
    fn test_markdown_link_alt_counter() {
        let mut counter = AltTextCounter::new();
        let buffer = ImageBuffer::new(b"foo".to_vec(), "a.png");

        assert_eq!(
            Base64Codec::to_markdown_link(&buffer, None, &mut counter),
            "![image0](data:image/png;base64,Zm9v)"
        );
        assert_eq!(
            Base64Codec::to_markdown_link(&buffer, Some("  "), &mut counter),
            "![image1](data:image/png;base64,Zm9v)"
        );
        assert_eq!(
            Base64Codec::to_markdown_link(&buffer, Some("cat [1].png"), &mut counter),
            "![cat 1.png](data:image/png;base64,Zm9v)"
        );
        assert_eq!(counter.next_alt(), "image2");
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(Base64Codec::extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(Base64Codec::extension_for_mime("image/png"), "png");
        assert_eq!(Base64Codec::extension_for_mime("image/svg+xml"), "svg");
        assert_eq!(Base64Codec::extension_for_mime("text/plain"), "png");
    }
}

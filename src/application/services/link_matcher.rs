//! Locates markdown image references and rewrites them by span.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::domain::entities::{LinkKind, LinkMatch};

/// What a scan should report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Report `![alt](http...)` links too.
    pub include_remote: bool,
}

impl ScanOptions {
    /// Embeds and base64 links only.
    #[must_use]
    pub const fn local() -> Self {
        Self {
            include_remote: false,
        }
    }

    /// Every recognised link shape.
    #[must_use]
    pub const fn with_remote() -> Self {
        Self {
            include_remote: true,
        }
    }
}

/// A substitution for one matched span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Byte span in the original text.
    pub span: Range<usize>,
    /// Text to put in place of the span.
    pub text: String,
}

impl Replacement {
    /// Replaces the span of `link` with `text`.
    #[must_use]
    pub fn for_link(link: &LinkMatch, text: impl Into<String>) -> Self {
        Self {
            span: link.span.clone(),
            text: text.into(),
        }
    }
}

static IMAGE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"!\[\[(?P<embed>[^\]\n]+\.(?i:png|jpe?g))\]\]",
        r"|!\[(?P<data_alt>[^\]\n]*)\]\((?P<data>data:image/[A-Za-z0-9.+-]+;base64,[^)\s]+)\)",
        r"|!\[(?P<url_alt>[^\]\n]*)\]\((?P<url>https?://[^)\s]+)\)",
    ))
    .expect("image link pattern is valid")
});

/// Finds image links in markdown and splices replacements into it.
pub struct LinkMatcher;

impl LinkMatcher {
    /// Finds image links left to right. Matches never overlap.
    ///
    /// Unterminated or malformed links are not reported.
    #[must_use]
    pub fn find_links(text: &str, options: ScanOptions) -> Vec<LinkMatch> {
        if !text.contains("![") {
            return Vec::new();
        }

        IMAGE_LINK_RE
            .captures_iter(text)
            .filter_map(|caps| Self::to_match(&caps))
            .filter(|link| options.include_remote || link.kind != LinkKind::Remote)
            .collect()
    }

    /// Finds links of one kind.
    #[must_use]
    pub fn find_kind(text: &str, kind: LinkKind) -> Vec<LinkMatch> {
        let options = ScanOptions {
            include_remote: kind == LinkKind::Remote,
        };
        Self::find_links(text, options)
            .into_iter()
            .filter(|link| link.kind == kind)
            .collect()
    }

    /// Returns the link under a cursor at byte `offset`.
    ///
    /// A cursor sitting right after the closing bracket still counts.
    #[must_use]
    pub fn link_at(text: &str, offset: usize, options: ScanOptions) -> Option<LinkMatch> {
        Self::find_links(text, options)
            .into_iter()
            .find(|link| link.touches(offset))
    }

    /// Applies span replacements in one pass over the original text.
    ///
    /// Spans refer to `text` as it was scanned. Each replacement is applied
    /// exactly once, so identical link text occurring several times is never
    /// substituted twice. Overlapping or out-of-range spans are dropped.
    #[must_use]
    pub fn splice(text: &str, mut replacements: Vec<Replacement>) -> String {
        replacements.sort_by_key(|r| r.span.start);

        let extra: usize = replacements.iter().map(|r| r.text.len()).sum();
        let mut output = String::with_capacity(text.len() + extra);
        let mut cursor = 0;

        for replacement in replacements {
            let Range { start, end } = replacement.span;
            if start < cursor
                || end < start
                || end > text.len()
                || !text.is_char_boundary(start)
                || !text.is_char_boundary(end)
            {
                warn!(start, end, "Dropping invalid replacement span");
                continue;
            }

            output.push_str(&text[cursor..start]);
            output.push_str(&replacement.text);
            cursor = end;
        }

        output.push_str(&text[cursor..]);
        output
    }

    fn to_match(caps: &Captures<'_>) -> Option<LinkMatch> {
        let whole = caps.get(0)?;

        let (kind, reference, alt) = if let Some(path) = caps.name("embed") {
            (LinkKind::Embed, path.as_str(), "")
        } else if let Some(uri) = caps.name("data") {
            let alt = caps.name("data_alt").map_or("", |m| m.as_str());
            (LinkKind::Base64, uri.as_str(), alt)
        } else {
            let url = caps.name("url")?;
            let alt = caps.name("url_alt").map_or("", |m| m.as_str());
            (LinkKind::Remote, url.as_str(), alt)
        };

        Some(LinkMatch {
            kind,
            raw: whole.as_str().to_string(),
            span: whole.range(),
            reference: reference.to_string(),
            alt: alt.to_string(),
        })
    }
}

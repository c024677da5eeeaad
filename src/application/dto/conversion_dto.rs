//! Conversion request and policy DTOs.

use std::path::PathBuf;

use crate::domain::entities::{ImageSource, ResizeRule};

/// Which links a conversion pass leaves alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionFilters {
    /// Leave `![[...]]` embeds untouched.
    pub skip_internal_links: bool,
    /// Leave links whose reference starts with `http` untouched.
    pub skip_remote_links: bool,
    /// Literal substrings or `*` wildcard patterns.
    pub custom_filters: Vec<String>,
    /// Also convert `![alt](http...)` links in bulk passes.
    pub include_remote: bool,
}

impl ConversionFilters {
    /// Filters that skip nothing and leave remote links alone.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds a custom filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.custom_filters.push(filter.into());
        self
    }

    /// Enables fetching remote links in bulk passes.
    #[must_use]
    pub const fn with_remote(mut self) -> Self {
        self.include_remote = true;
        self
    }
}

/// Resizing applied before an image is embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizePolicy {
    /// Whether rules are evaluated at all.
    pub enabled: bool,
    /// Rules as configured.
    pub rules: Vec<ResizeRule>,
}

impl ResizePolicy {
    /// Policy that never resizes.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            rules: Vec::new(),
        }
    }

    /// Policy evaluating `rules`.
    #[must_use]
    pub const fn with_rules(rules: Vec<ResizeRule>) -> Self {
        Self {
            enabled: true,
            rules,
        }
    }

    /// Returns true if resizing can change anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.rules.is_empty()
    }
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Size gate for pasted and dropped images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    /// Whether the gate is on.
    pub enabled: bool,
    /// Threshold in KB.
    pub value_kb: f64,
    /// Skip images above the threshold instead of at or below it.
    pub trigger_when_larger: bool,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            value_kb: 0.0,
            trigger_when_larger: true,
        }
    }
}

/// How an image reached the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Clipboard paste.
    Paste,
    /// File drop.
    Drop,
}

impl std::fmt::Display for InsertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paste => write!(f, "paste"),
            Self::Drop => write!(f, "drop"),
        }
    }
}

/// Settings consulted when an image is pasted or dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSettings {
    /// Convert pasted images.
    pub convert_on_paste: bool,
    /// Convert dropped images.
    pub convert_on_drop: bool,
    /// Size gate.
    pub threshold: ThresholdPolicy,
}

impl InsertSettings {
    /// Returns whether `mode` is enabled.
    #[must_use]
    pub const fn converts(&self, mode: InsertMode) -> bool {
        match mode {
            InsertMode::Paste => self.convert_on_paste,
            InsertMode::Drop => self.convert_on_drop,
        }
    }
}

impl Default for InsertSettings {
    fn default() -> Self {
        Self {
            convert_on_paste: true,
            convert_on_drop: true,
            threshold: ThresholdPolicy::default(),
        }
    }
}

/// Image inserted into a note.
#[derive(Debug, Clone)]
pub struct InsertRequest {
    /// Vault-relative note receiving the image.
    pub note: PathBuf,
    /// Image to insert.
    pub source: ImageSource,
    /// Paste or drop.
    pub mode: InsertMode,
    /// Byte offset to insert at, end of the note when `None`.
    pub offset: Option<usize>,
}

impl InsertRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(note: impl Into<PathBuf>, source: ImageSource, mode: InsertMode) -> Self {
        Self {
            note: note.into(),
            source,
            mode,
            offset: None,
        }
    }

    /// Inserts at byte `offset` instead of the end of the note.
    #[must_use]
    pub const fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Result of an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The note now contains `text`.
    Inserted {
        /// Markdown link written, including any trailing newline.
        text: String,
    },
    /// Conversion is turned off for this mode; the host keeps its default.
    Disabled,
    /// The size gate rejected the image.
    Skipped {
        /// Image size in KB.
        size_kb: u64,
    },
}

/// Result of a single-link conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConversion {
    /// Text that replaced the link.
    pub replacement: String,
    /// Attachment created, for base64 exports.
    pub attachment: Option<PathBuf>,
}

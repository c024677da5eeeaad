//! Stateless application services shared by the use cases.

pub mod attachment_locks;
pub mod base64_codec;
pub mod cursor_escape;
pub mod image_preparer;
pub mod link_filter;
pub mod link_matcher;

pub use attachment_locks::AttachmentLocks;
pub use base64_codec::{AltTextCounter, Base64Codec};
pub use cursor_escape::{CursorTarget, escape_target};
pub use image_preparer::ImagePreparer;
pub use link_filter::{LinkFilter, should_skip};
pub use link_matcher::{LinkMatcher, Replacement, ScanOptions};

//! vault64 - convert markdown image embeds to inline base64 and back.
//!
//! This crate turns `![[image.png]]` embeds and remote image links into
//! `data:` URI images inside notes, and moves inline images back out into
//! vault attachments. The same engine handles single links at a cursor,
//! paste and drop insertion, and bulk runs over a note, folder or vault.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases, services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "vault64";

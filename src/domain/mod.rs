//! Domain layer with image entities, errors, resize rules and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Pure decision logic.
pub mod services;

pub use entities::{ImageBuffer, LinkKind, LinkMatch, ResizeRule};
pub use errors::ConversionError;
pub use ports::{ImageScalerPort, NotificationPort, RemoteFetchPort, VaultPort};
pub use services::ResizeRuleEngine;

//! Infrastructure layer with filesystem, network and codec adapters.

/// Application configuration.
pub mod config;
/// Image fetching and scaling.
pub mod image;
/// Console notices.
pub mod notifications;
/// Filesystem vault.
pub mod vault;

pub use config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
pub use image::{HttpImageFetcher, ImageCrateScaler};
pub use notifications::ConsoleNotificationService;
pub use vault::FsVault;

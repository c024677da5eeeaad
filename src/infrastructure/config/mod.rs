//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, LogLevel, NetworkConfig, ResizingConfig, ThresholdConfig, VaultConfig};
pub use args::{CliArgs, Command, FilterArgs, ScopeArgs};
pub use storage::{ConfigError, StorageManager};

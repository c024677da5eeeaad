//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::dto::{InsertSettings, ResizePolicy, ThresholdPolicy};
use crate::domain::entities::{ResizeRule, default_rules};

use super::args::CliArgs;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Convert pasted images to base64.
    #[serde(default = "default_true")]
    pub convert_on_paste: bool,

    /// Convert dropped images to base64.
    #[serde(default = "default_true")]
    pub convert_on_drop: bool,

    /// Move the cursor out of data URIs in `escape`.
    #[serde(default)]
    pub auto_avoid_expansion: bool,

    /// Resize rules.
    #[serde(default)]
    pub resizing: ResizingConfig,

    /// Size gate for pasted and dropped images.
    #[serde(default)]
    pub threshold: ThresholdConfig,

    /// Vault location and layout.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Remote fetching and parallelism.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Resize configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizingConfig {
    /// Apply rules before embedding.
    #[serde(default)]
    pub enabled: bool,

    /// `(trigger, percentage)` rules.
    #[serde(default = "default_rules")]
    pub rules: Vec<ResizeRule>,
}

impl Default for ResizingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rules: default_rules(),
        }
    }
}

/// Threshold configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Gate enabled.
    #[serde(default)]
    pub enabled: bool,

    /// Threshold in KB.
    #[serde(default = "default_threshold_kb")]
    pub value_kb: f64,

    /// Skip images above the threshold instead of at or below it.
    #[serde(default = "default_true")]
    pub trigger_when_larger: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            value_kb: default_threshold_kb(),
            trigger_when_larger: true,
        }
    }
}

/// Vault configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault root directory, the working directory when unset.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Where exported attachments go.
    ///
    /// Empty means the vault root, `./sub` is relative to the note, and
    /// anything else is relative to the vault root.
    #[serde(default)]
    pub attachment_folder: String,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Remote fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Documents processed at once in bulk conversions.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_threshold_kb() -> f64 {
    1024.0
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    1
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(vault) = &args.vault {
            self.vault.root = Some(vault.clone());
        }
        if let Some(resize) = args.resize {
            self.resizing.enabled = resize;
        }
        if let Some(attachment_folder) = &args.attachment_folder {
            self.vault.attachment_folder.clone_from(attachment_folder);
        }
        if let Some(concurrency) = args.concurrency {
            self.network.concurrency = concurrency;
        }
        if let Some(timeout) = args.timeout {
            self.network.timeout_secs = timeout;
        }
    }

    /// Resize policy for the use cases.
    #[must_use]
    pub fn resize_policy(&self) -> ResizePolicy {
        ResizePolicy {
            enabled: self.resizing.enabled,
            rules: self.resizing.rules.clone(),
        }
    }

    /// Paste and drop settings for the use cases.
    #[must_use]
    pub const fn insert_settings(&self) -> InsertSettings {
        InsertSettings {
            convert_on_paste: self.convert_on_paste,
            convert_on_drop: self.convert_on_drop,
            threshold: ThresholdPolicy {
                enabled: self.threshold.enabled,
                value_kb: self.threshold.value_kb,
                trigger_when_larger: self.threshold.trigger_when_larger,
            },
        }
    }

    /// Returns the log file path, if logging to a file was requested.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            convert_on_paste: true,
            convert_on_drop: true,
            auto_avoid_expansion: false,
            resizing: ResizingConfig::default(),
            threshold: ThresholdConfig::default(),
            vault: VaultConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

use super::app_config::LogLevel;
use crate::application::dto::ConversionFilters;
use crate::domain::entities::ConversionScope;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "vault64",
    version,
    about = "Convert vault image embeds to inline base64 and back",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Vault root directory.
    #[arg(long, value_name = "DIR", env = "VAULT64_VAULT", global = true)]
    pub vault: Option<PathBuf>,

    /// Apply resize rules before embedding.
    #[arg(long, global = true)]
    pub resize: Option<bool>,

    /// Attachment folder for exported images.
    #[arg(long, value_name = "FOLDER", global = true)]
    pub attachment_folder: Option<String>,

    /// Documents converted at once.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Remote fetch timeout in seconds.
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inline `![[image]]` embeds as base64 data URIs.
    Embed {
        /// Notes to convert.
        #[command(flatten)]
        scope: ScopeArgs,
        /// Links to leave alone.
        #[command(flatten)]
        filters: FilterArgs,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Move base64 data URIs out into vault attachments.
    Export {
        /// Notes to convert.
        #[command(flatten)]
        scope: ScopeArgs,
        /// Links to leave alone.
        #[command(flatten)]
        filters: FilterArgs,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Convert the single link at a byte offset.
    Link {
        /// Note containing the link.
        #[arg(long, value_name = "NOTE")]
        note: PathBuf,
        /// Byte offset inside the link.
        #[arg(long)]
        offset: usize,
    },
    /// Insert an image file into a note as base64.
    Insert {
        /// Note receiving the image.
        #[arg(long, value_name = "NOTE")]
        note: PathBuf,
        /// Image file on disk.
        image: PathBuf,
        /// Treat the image as dropped rather than pasted.
        #[arg(long)]
        drop: bool,
        /// Byte offset to insert at, end of the note by default.
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Print where a cursor inside a data URI should move to.
    Escape {
        /// Note to inspect.
        #[arg(long, value_name = "NOTE")]
        note: PathBuf,
        /// Zero-based line number.
        #[arg(long)]
        line: usize,
        /// Byte column within the line.
        #[arg(long)]
        column: usize,
    },
}

/// Which notes a bulk command touches.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ScopeArgs {
    /// Convert a single note.
    #[arg(long, value_name = "NOTE")]
    pub note: Option<PathBuf>,

    /// Convert every note in the folder of NOTE.
    #[arg(long, value_name = "NOTE")]
    pub folder: Option<PathBuf>,

    /// Convert every note in the vault.
    #[arg(long)]
    pub all: bool,
}

impl ScopeArgs {
    /// Returns the selected scope.
    #[must_use]
    pub fn to_scope(&self) -> ConversionScope {
        match (&self.note, &self.folder) {
            (Some(note), _) => ConversionScope::Note(note.clone()),
            (None, Some(folder)) => ConversionScope::Folder(folder.clone()),
            (None, None) => ConversionScope::Vault,
        }
    }
}

/// Link filters for bulk commands.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Leave `![[...]]` embeds untouched.
    #[arg(long)]
    pub skip_internal: bool,

    /// Leave links starting with `http` untouched.
    #[arg(long)]
    pub skip_remote: bool,

    /// Skip links containing TEXT, or matching it when it contains `*`.
    #[arg(long = "filter", value_name = "TEXT")]
    pub filters: Vec<String>,

    /// Also fetch and inline remote images.
    #[arg(long)]
    pub remote: bool,
}

impl FilterArgs {
    /// Returns the filters for the use cases.
    #[must_use]
    pub fn to_filters(&self) -> ConversionFilters {
        ConversionFilters {
            skip_internal_links: self.skip_internal,
            skip_remote_links: self.skip_remote,
            custom_filters: self.filters.clone(),
            include_remote: self.remote,
        }
    }
}

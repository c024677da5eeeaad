use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vault64::application::services::{CursorTarget, ImagePreparer, escape_target};
use vault64::application::{
    ConvertLinkUseCase, ConvertScopeUseCase, EmbedToBase64UseCase, ExportBase64UseCase,
    InsertImageUseCase, InsertMode, InsertOutcome, InsertRequest,
};
use vault64::domain::entities::{ConversionDirection, ImageSource, ScopeReport};
use vault64::domain::ports::VaultPort;
use vault64::infrastructure::config::{FilterArgs, ScopeArgs};
use vault64::infrastructure::{
    AppConfig, CliArgs, Command, ConsoleNotificationService, FsVault, HttpImageFetcher,
    ImageCrateScaler, StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time();

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new().wrap_err("Failed to locate config directory")?;
    let mut config = storage
        .load_config(args.config.as_deref())
        .wrap_err("Failed to load configuration")?;
    config.merge_with_args(args);
    Ok(config)
}

/// Adapters and use cases wired for one run.
struct Services {
    vault: Arc<FsVault>,
    scope: ConvertScopeUseCase,
    link: ConvertLinkUseCase,
    insert: InsertImageUseCase,
}

impl Services {
    fn build(config: &AppConfig) -> Result<Self> {
        let root = match &config.vault.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        if !root.is_dir() {
            return Err(eyre!("Vault root {} is not a directory", root.display()));
        }

        let vault = Arc::new(FsVault::new(root, config.vault.attachment_folder.clone()));
        let fetcher = Arc::new(HttpImageFetcher::new(config.network.timeout_secs)?);
        let notifier = Arc::new(ConsoleNotificationService::new(true));

        let preparer = ImagePreparer::new(vault.clone(), fetcher, Arc::new(ImageCrateScaler::new()));
        let embed = EmbedToBase64UseCase::new(vault.clone(), preparer.clone(), config.resize_policy());
        let export = ExportBase64UseCase::new(vault.clone());

        Ok(Self {
            scope: ConvertScopeUseCase::new(vault.clone(), embed.clone(), export.clone(), notifier.clone())
                .with_concurrency(config.network.concurrency),
            link: ConvertLinkUseCase::new(vault.clone(), embed, export, notifier),
            insert: InsertImageUseCase::new(
                vault.clone(),
                preparer,
                config.resize_policy(),
                config.insert_settings(),
            ),
            vault,
        })
    }
}

async fn run_scope(
    services: &Services,
    scope: &ScopeArgs,
    filters: &FilterArgs,
    direction: ConversionDirection,
    json: bool,
) -> Result<()> {
    let report = services
        .scope
        .execute(&scope.to_scope(), direction, &filters.to_filters())
        .await?;
    print_report(&report, json)
}

fn print_report(report: &ScopeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for failed in report.failed_documents() {
        if let Some(error) = &failed.error {
            eprintln!("{}: {error}", failed.path.display());
        }
    }
    Ok(())
}

async fn run_insert(
    services: &Services,
    note: PathBuf,
    image: &Path,
    drop: bool,
    offset: Option<usize>,
) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .wrap_err_with(|| format!("Failed to read {}", image.display()))?;
    let filename = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mode = if drop { InsertMode::Drop } else { InsertMode::Paste };
    let source = ImageSource::RawBytes {
        bytes: bytes.into(),
        filename,
    };
    let mut request = InsertRequest::new(note, source, mode);
    if let Some(offset) = offset {
        request = request.at_offset(offset);
    }

    match services.insert.execute(request).await? {
        InsertOutcome::Inserted { .. } => println!("Inserted {}", image.display()),
        InsertOutcome::Disabled => println!("Conversion on {mode} is disabled"),
        InsertOutcome::Skipped { size_kb } => {
            println!("Skipped {} ({size_kb} KB)", image.display());
        }
    }
    Ok(())
}

async fn run_escape(
    services: &Services,
    note: &Path,
    line: usize,
    column: usize,
    enabled: bool,
) -> Result<()> {
    if !enabled {
        println!("{line}:{column}");
        return Ok(());
    }

    let text = services.vault.read_text(note).await?;
    let content = text
        .lines()
        .nth(line)
        .ok_or_else(|| eyre!("{} has no line {line}", note.display()))?;

    match escape_target(content, column) {
        Some(CursorTarget::Column(target)) => println!("{line}:{target}"),
        Some(CursorTarget::NextLine) => println!("{}:0", line + 1),
        None => println!("{line}:{column}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = vault64::VERSION, "Starting vault64");

    let services = Services::build(&config)?;

    match args.command {
        Command::Embed {
            scope,
            filters,
            json,
        } => {
            run_scope(
                &services,
                &scope,
                &filters,
                ConversionDirection::EmbedToBase64,
                json,
            )
            .await
        }
        Command::Export {
            scope,
            filters,
            json,
        } => {
            run_scope(
                &services,
                &scope,
                &filters,
                ConversionDirection::Base64ToEmbed,
                json,
            )
            .await
        }
        Command::Link { note, offset } => {
            let conversion = services.link.execute(&note, offset).await?;
            match conversion.attachment {
                Some(path) => println!("Linked {}", path.display()),
                None => println!("Embedded image at offset {offset}"),
            }
            Ok(())
        }
        Command::Insert {
            note,
            image,
            drop,
            offset,
        } => run_insert(&services, note, &image, drop, offset).await,
        Command::Escape { note, line, column } => {
            run_escape(&services, &note, line, column, config.auto_avoid_expansion).await
        }
    }
}

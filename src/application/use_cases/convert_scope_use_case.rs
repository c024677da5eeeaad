//! Bulk conversion over a note, folder, or vault.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::{StreamExt, stream};
use tracing::{error, info};

use crate::application::dto::ConversionFilters;
use crate::domain::entities::{ConversionDirection, ConversionResult, ConversionScope, ScopeReport};
use crate::domain::errors::ConversionError;
use crate::domain::ports::{NotificationPort, VaultPort};

use super::{EmbedToBase64UseCase, ExportBase64UseCase};

const NOTICE_TITLE: &str = crate::NAME;

/// Runs one conversion direction over every document of a scope.
#[derive(Clone)]
pub struct ConvertScopeUseCase {
    vault: Arc<dyn VaultPort>,
    embed: EmbedToBase64UseCase,
    export: ExportBase64UseCase,
    notifier: Arc<dyn NotificationPort>,
    concurrency: usize,
}

impl ConvertScopeUseCase {
    /// Creates new scope use case processing one document at a time.
    #[must_use]
    pub const fn new(
        vault: Arc<dyn VaultPort>,
        embed: EmbedToBase64UseCase,
        export: ExportBase64UseCase,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            vault,
            embed,
            export,
            notifier,
            concurrency: 1,
        }
    }

    /// Processes up to `concurrency` documents at once.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Converts every document of `scope` and notifies a summary.
    ///
    /// A document that cannot be read or written is recorded as failed in
    /// the report; the remaining documents are still processed.
    ///
    /// # Errors
    /// Returns `EmptyScope` when the scope resolves to no documents, or a
    /// storage error if the scope cannot be listed.
    pub async fn execute(
        &self,
        scope: &ConversionScope,
        direction: ConversionDirection,
        filters: &ConversionFilters,
    ) -> Result<ScopeReport, ConversionError> {
        let documents = self.vault.list_documents(scope).await?;
        if documents.is_empty() {
            let err = ConversionError::EmptyScope {
                scope: scope.to_string(),
            };
            self.notifier.send(NOTICE_TITLE, &err.to_string());
            return Err(err);
        }

        info!(
            %scope,
            ?direction,
            documents = documents.len(),
            concurrency = self.concurrency,
            "Starting conversion"
        );

        let mut results: Vec<ConversionResult> = stream::iter(documents)
            .map(|path| self.convert_one(path, direction, filters))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        results.sort_by(|a, b| a.path.cmp(&b.path));

        let report = ScopeReport::new(direction, results);
        let summary = report.summary();
        info!(
            converted = report.converted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "{summary}"
        );
        self.notifier.send(NOTICE_TITLE, &summary);

        Ok(report)
    }

    async fn convert_one(
        &self,
        path: PathBuf,
        direction: ConversionDirection,
        filters: &ConversionFilters,
    ) -> ConversionResult {
        let outcome = match direction {
            ConversionDirection::EmbedToBase64 => {
                self.embed.convert_document(&path, filters).await
            }
            ConversionDirection::Base64ToEmbed => {
                self.export.convert_document(&path, filters).await
            }
        };

        outcome.unwrap_or_else(|e| {
            error!(document = %path.display(), error = %e, "Document conversion failed");
            ConversionResult::failed(path, e.to_string())
        })
    }
}

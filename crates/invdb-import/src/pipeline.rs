//! Import orchestration.
//!
//! A run moves through `acquiring → parsing → normalizing → submitting →
//! aggregating → reported`. Anything that goes wrong before submission stops
//! the run with no writes issued. Once submission starts, individual write
//! failures are recorded in the summary and the run always finishes.
//!
//! Normalization is fail-fast: one bad record aborts the whole file.
//! Submission is lenient: one failed write affects nothing else.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{ImportError, ValidationError};
use crate::normalize::normalize;
use crate::notify::{NotificationKind, Notifier};
use crate::plan::{plan, DEFAULT_BATCH_SIZE};
use crate::source::FileSource;
use crate::submit::{submit_batch, DeviceWriter};
use crate::types::{ImportPhase, ImportSummary};
use invdb_core::Device;

/// Accept filter passed to the file source.
pub const ACCEPTED_FILE_TYPES: &str = ".json";

/// Drives one bulk import from file to summary.
pub struct Importer<S, W, N> {
    source: S,
    writer: W,
    notifier: N,
    batch_size: usize,
}

impl<S, W, N> Importer<S, W, N>
where
    S: FileSource,
    W: DeviceWriter,
    N: Notifier,
{
    /// Creates an importer using [`DEFAULT_BATCH_SIZE`].
    pub fn new(source: S, writer: W, notifier: N) -> Self {
        Self {
            source,
            writer,
            notifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Overrides how many writes may be in flight at once.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Configuration`] if `batch_size` is zero.
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self, ImportError> {
        if batch_size == 0 {
            return Err(ImportError::Configuration(batch_size));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Runs the import and reports the result through the notifier.
    ///
    /// Returns the summary even when some writes failed; check
    /// [`ImportSummary::has_failures`].
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] if the file cannot be acquired or parsed, or any
    /// record fails normalization. No writes have been issued in that case.
    pub async fn run(&self) -> Result<ImportSummary, ImportError> {
        self.notifier.notify(
            NotificationKind::Loading,
            "Importing file...",
            "Please wait until the file is imported",
        );

        match self.execute().await {
            Ok(summary) => {
                self.report(&summary);
                enter(ImportPhase::Reported);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(phase = %e.phase(), error = %e, "import aborted");
                enter(ImportPhase::Failed);
                self.notifier
                    .notify(NotificationKind::Error, "File import failed", &e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<ImportSummary, ImportError> {
        enter(ImportPhase::Acquiring);
        let text = self.source.acquire(ACCEPTED_FILE_TYPES).await?;

        enter(ImportPhase::Parsing);
        let records = parse_records(&text)?;

        enter(ImportPhase::Normalizing);
        let devices = normalize_all(&records, Utc::now())?;

        let batches = plan(devices, self.batch_size)?;
        let batch_count = batches.len();
        tracing::info!(
            records = records.len(),
            batches = batch_count,
            batch_size = self.batch_size,
            "import planned"
        );

        let mut outcomes = Vec::with_capacity(records.len());
        for batch in &batches {
            enter(ImportPhase::Submitting {
                batch: batch.index + 1,
                of: batch_count,
            });
            let settled = submit_batch(batch, &self.writer).await;
            let failed = settled.iter().filter(|o| !o.is_success()).count();
            tracing::info!(
                batch = batch.index + 1,
                of = batch_count,
                size = batch.len(),
                failed,
                "batch settled"
            );
            outcomes.extend(settled);
        }

        enter(ImportPhase::Aggregating);
        Ok(ImportSummary::from_outcomes(outcomes))
    }

    fn report(&self, summary: &ImportSummary) {
        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "import finished"
        );

        if summary.has_failures() {
            self.notifier.notify(
                NotificationKind::Error,
                "File import failed",
                &format!("{} devices failed to import", summary.failed),
            );
            return;
        }

        self.notifier.notify(
            NotificationKind::Success,
            "File import successful",
            &format!("Successfully imported {} devices", summary.total),
        );
    }
}

fn enter(phase: ImportPhase) {
    tracing::debug!(phase = %phase, "import phase");
}

/// Parses the file body as a JSON array.
///
/// # Errors
///
/// Returns [`ImportError::Format`] if the text is not JSON or the top-level
/// value is not an array.
pub fn parse_records(text: &str) -> Result<Vec<Value>, ImportError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(ImportError::Format(
            "expected a JSON array of devices".to_string(),
        )),
        Err(e) => Err(ImportError::Format(e.to_string())),
    }
}

/// Normalizes every record, stopping at the first one that fails.
///
/// # Errors
///
/// Returns [`ImportError::Validation`] naming the index of the first invalid
/// record.
pub fn normalize_all(records: &[Value], now: DateTime<Utc>) -> Result<Vec<Device>, ImportError> {
    records
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .as_object()
                .ok_or(ValidationError::NotAnObject)
                .and_then(|raw| normalize(raw, now))
                .map_err(|source| ImportError::Validation { index, source })
        })
        .collect()
}

use invdb_core::{Device, DeviceKeys};

/// One element of the import file, exactly as parsed. Not trusted.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A contiguous, order-preserving slice of the import list.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    /// Zero-based position of this batch in the plan.
    pub index: usize,
    pub devices: Vec<Device>,
}

impl ImportBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    pub keys: DeviceKeys,
    pub reason: String,
}

impl std::fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.keys, self.reason)
    }
}

/// Result of one settled write.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The record as confirmed by the server.
    Success(Device),
    Failure(ImportFailure),
}

impl ImportOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Success(_))
    }
}

/// Aggregate of every outcome in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ImportOutcome>) -> Self {
        let mut total = 0;
        let mut succeeded = 0;
        let mut failures = Vec::new();
        for outcome in outcomes {
            total += 1;
            match outcome {
                ImportOutcome::Success(_) => succeeded += 1,
                ImportOutcome::Failure(failure) => failures.push(failure),
            }
        }
        Self {
            total,
            succeeded,
            failed: failures.len(),
            failures,
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Where an import run is, for logging and error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    Acquiring,
    Parsing,
    Normalizing,
    /// `batch` is one-based.
    Submitting { batch: usize, of: usize },
    Aggregating,
    Reported,
    Failed,
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportPhase::Idle => write!(f, "idle"),
            ImportPhase::Acquiring => write!(f, "acquiring"),
            ImportPhase::Parsing => write!(f, "parsing"),
            ImportPhase::Normalizing => write!(f, "normalizing"),
            ImportPhase::Submitting { batch, of } => write!(f, "submitting batch {batch} of {of}"),
            ImportPhase::Aggregating => write!(f, "aggregating"),
            ImportPhase::Reported => write!(f, "reported"),
            ImportPhase::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn device(sk: &str) -> Device {
        Device {
            keys: DeviceKeys::new("freezer", sk).unwrap(),
            id: sk.parse().ok(),
            device_type: None,
            location: None,
            health: None,
            price: Decimal::ZERO,
            color: None,
            last_used: Utc::now(),
        }
    }

    #[test]
    fn summary_counts_successes_and_failures() {
        let summary = ImportSummary::from_outcomes(vec![
            ImportOutcome::Success(device("1")),
            ImportOutcome::Failure(ImportFailure {
                keys: DeviceKeys::new("freezer", "2").unwrap(),
                reason: "boom".to_string(),
            }),
            ImportOutcome::Success(device("3")),
        ]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());
        assert_eq!(summary.failures[0].to_string(), "freezer/2: boom");
    }

    #[test]
    fn empty_summary_has_no_failures() {
        let summary = ImportSummary::from_outcomes(Vec::new());
        assert_eq!(summary.total, 0);
        assert!(!summary.has_failures());
    }

    #[test]
    fn submitting_phase_displays_progress() {
        let phase = ImportPhase::Submitting { batch: 2, of: 3 };
        assert_eq!(phase.to_string(), "submitting batch 2 of 3");
    }
}

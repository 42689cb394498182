use invdb_client::ClientError;
use invdb_core::CoreError;
use thiserror::Error;

use crate::types::ImportPhase;

/// Errors that abort an import run before any device is written.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The user dismissed the file prompt without choosing a file.
    #[error("No file selected")]
    Aborted,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not an accepted file type (expected {accept})")]
    UnsupportedFile { path: String, accept: String },

    /// The file is not valid JSON, or its top-level value is not an array.
    #[error("Invalid file format: {0}")]
    Format(String),

    /// A record could not be normalized. The whole run stops here.
    #[error("record at index {index} is invalid: {source}")]
    Validation {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("invalid batch size {0}: must be a positive integer")]
    Configuration(usize),
}

impl ImportError {
    /// The pipeline phase the run was in when this error stopped it.
    #[must_use]
    pub fn phase(&self) -> ImportPhase {
        match self {
            ImportError::Aborted | ImportError::Io { .. } | ImportError::UnsupportedFile { .. } => {
                ImportPhase::Acquiring
            }
            ImportError::Format(_) => ImportPhase::Parsing,
            ImportError::Validation { .. } => ImportPhase::Normalizing,
            ImportError::Configuration(_) => ImportPhase::Idle,
        }
    }
}

/// Why a single raw record could not become a [`invdb_core::Device`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// A single rejected write. Captured in the outcome, never propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct WriteError {
    reason: String,
}

impl WriteError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<ClientError> for WriteError {
    fn from(err: ClientError) -> Self {
        Self::new(err.to_string())
    }
}

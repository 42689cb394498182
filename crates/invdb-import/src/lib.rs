//! Bulk device import: read a JSON file of device records, normalize them,
//! and upsert them in bounded concurrent batches.
//!
//! [`Importer::run`] drives the whole pipeline. The stages are exposed on
//! their own ([`normalize`], [`plan`], [`submit_batch`]) so callers can reuse
//! them without a file source.

pub mod error;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod plan;
pub mod source;
pub mod submit;
pub mod types;

pub use error::{ImportError, ValidationError, WriteError};
pub use normalize::normalize;
pub use notify::{NotificationKind, Notifier, TracingNotifier};
pub use pipeline::{normalize_all, parse_records, Importer, ACCEPTED_FILE_TYPES};
pub use plan::{plan, DEFAULT_BATCH_SIZE};
pub use source::{FileSource, PathSource};
pub use submit::{submit_batch, DeviceWriter};
pub use types::{ImportBatch, ImportFailure, ImportOutcome, ImportPhase, ImportSummary, RawRecord};

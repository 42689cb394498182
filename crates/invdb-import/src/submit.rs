//! Concurrent, settle-all submission of one batch.

use std::future::Future;

use futures::future::join_all;
use invdb_client::DevicesClient;
use invdb_core::Device;

use crate::error::WriteError;
use crate::types::{ImportBatch, ImportFailure, ImportOutcome};

/// A single-record upsert, idempotent on the device's key pair.
pub trait DeviceWriter {
    /// Writes `device` and returns the record as the server confirmed it.
    fn write(&self, device: &Device) -> impl Future<Output = Result<Device, WriteError>> + Send;
}

impl DeviceWriter for DevicesClient {
    fn write(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Device, WriteError>> + Send {
        async move { self.upsert_device(device).await.map_err(WriteError::from) }
    }
}

/// Writes every device in `batch` concurrently and waits for all of them.
///
/// Returns one outcome per device, in batch order regardless of completion
/// order. A failed write becomes [`ImportOutcome::Failure`]; it never cancels
/// its siblings and never escapes this function.
pub async fn submit_batch<W: DeviceWriter>(
    batch: &ImportBatch,
    writer: &W,
) -> Vec<ImportOutcome> {
    let writes = batch.devices.iter().map(|device| async move {
        match writer.write(device).await {
            Ok(confirmed) => ImportOutcome::Success(confirmed),
            Err(e) => {
                tracing::warn!(
                    batch = batch.index,
                    keys = %device.keys,
                    error = %e,
                    "device write failed"
                );
                ImportOutcome::Failure(ImportFailure {
                    keys: device.keys.clone(),
                    reason: e.reason().to_string(),
                })
            }
        }
    });

    join_all(writes).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use invdb_core::DeviceKeys;
    use rust_decimal::Decimal;

    use super::*;

    /// Rejects the listed ids; later ids finish first.
    struct ScriptedWriter {
        reject: HashSet<i64>,
        calls: Arc<AtomicUsize>,
    }

    impl DeviceWriter for ScriptedWriter {
        fn write(
            &self,
            device: &Device,
        ) -> impl Future<Output = Result<Device, WriteError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let id = device.id.unwrap_or_default();
            let reject = self.reject.contains(&id);
            let device = device.clone();
            async move {
                let delay = 20u64.saturating_sub(u64::try_from(id).unwrap_or(0) * 4);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                if reject {
                    Err(WriteError::new(format!("device {id} rejected")))
                } else {
                    Ok(device)
                }
            }
        }
    }

    fn batch(n: i64) -> ImportBatch {
        let now = Utc::now();
        ImportBatch {
            index: 0,
            devices: (1..=n)
                .map(|id| Device {
                    keys: DeviceKeys::new("shaker", id.to_string()).unwrap(),
                    id: Some(id),
                    device_type: None,
                    location: None,
                    health: None,
                    price: Decimal::ZERO,
                    color: None,
                    last_used: now,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn outcomes_follow_input_order_with_failures_in_place() {
        let calls = Arc::new(AtomicUsize::new(0));
        let writer = ScriptedWriter {
            reject: HashSet::from([2, 4]),
            calls: Arc::clone(&calls),
        };

        let outcomes = submit_batch(&batch(5), &writer).await;

        let pattern: Vec<bool> = outcomes.iter().map(ImportOutcome::is_success).collect();
        assert_eq!(pattern, vec![true, false, true, false, true]);
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        match &outcomes[1] {
            ImportOutcome::Failure(f) => {
                assert_eq!(f.keys.secondary_key(), "2");
                assert_eq!(f.reason, "device 2 rejected");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        match &outcomes[4] {
            ImportOutcome::Success(d) => assert_eq!(d.id, Some(5)),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_failures_still_settle_every_write() {
        let calls = Arc::new(AtomicUsize::new(0));
        let writer = ScriptedWriter {
            reject: (1..=4).collect(),
            calls: Arc::clone(&calls),
        };

        let outcomes = submit_batch(&batch(4), &writer).await;

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| !o.is_success()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn empty_batch_yields_no_outcomes() {
        let writer = ScriptedWriter {
            reject: HashSet::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        assert!(submit_batch(&batch(0), &writer).await.is_empty());
    }
}

//! Splits the normalized import list into bounded batches.

use invdb_core::Device;

use crate::error::ImportError;
use crate::types::ImportBatch;

/// Caps the number of writes in flight at once.
pub const DEFAULT_BATCH_SIZE: usize = invdb_core::DEFAULT_IMPORT_BATCH_SIZE;

/// Partitions `records` into consecutive batches of `size`.
///
/// Every batch holds exactly `size` devices except possibly the last.
/// Concatenating the batches reproduces `records` in order. An empty input
/// yields no batches.
///
/// # Errors
///
/// Returns [`ImportError::Configuration`] if `size` is zero.
pub fn plan(records: Vec<Device>, size: usize) -> Result<Vec<ImportBatch>, ImportError> {
    if size == 0 {
        return Err(ImportError::Configuration(size));
    }

    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut remaining = records.into_iter().peekable();
    while remaining.peek().is_some() {
        let devices: Vec<Device> = remaining.by_ref().take(size).collect();
        batches.push(ImportBatch {
            index: batches.len(),
            devices,
        });
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use invdb_core::DeviceKeys;
    use rust_decimal::Decimal;

    use super::*;

    fn devices(n: usize) -> Vec<Device> {
        let now = Utc::now();
        (0..n)
            .map(|i| Device {
                keys: DeviceKeys::new("cycler", i.to_string()).unwrap(),
                id: i64::try_from(i).ok(),
                device_type: None,
                location: None,
                health: None,
                price: Decimal::ZERO,
                color: None,
                last_used: now,
            })
            .collect()
    }

    fn ids(batches: &[ImportBatch]) -> Vec<i64> {
        batches
            .iter()
            .flat_map(|b| b.devices.iter().filter_map(|d| d.id))
            .collect()
    }

    #[test]
    fn zero_size_is_a_configuration_error() {
        let err = plan(devices(3), 0).unwrap_err();
        assert!(matches!(err, ImportError::Configuration(0)));
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(plan(Vec::new(), 100).unwrap().is_empty());
    }

    #[test]
    fn two_hundred_fifty_records_split_into_100_100_50() {
        let batches = plan(devices(250), 100).unwrap();
        let sizes: Vec<usize> = batches.iter().map(ImportBatch::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        let indexes: Vec<usize> = batches.iter().map(|b| b.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn exact_multiple_has_full_last_batch() {
        let batches = plan(devices(200), 100).unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 100));
    }

    #[test]
    fn lengths_order_and_count_hold_for_many_shapes() {
        for n in 1..=37 {
            for size in 1..=12 {
                let batches = plan(devices(n), size).unwrap();
                let (last, full) = batches.split_last().unwrap();

                assert!(full.iter().all(|b| b.len() == size), "n={n} size={size}");
                let expected_last = if n % size == 0 { size } else { n % size };
                assert_eq!(last.len(), expected_last, "n={n} size={size}");

                let expected: Vec<i64> = (0..n).map(|i| i64::try_from(i).unwrap()).collect();
                assert_eq!(ids(&batches), expected, "n={n} size={size}");
            }
        }
    }
}

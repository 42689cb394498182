//! `import` command handler.

use std::path::Path;

use invdb_client::DevicesClient;
use invdb_import::{Importer, NotificationKind, Notifier, PathSource};

/// Prints notifications to the terminal. Errors go to stderr.
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, description: &str) {
        let line = render_notification(kind, title, description);
        match kind {
            NotificationKind::Error => eprintln!("{line}"),
            NotificationKind::Loading | NotificationKind::Success => println!("{line}"),
        }
    }
}

pub(crate) fn render_notification(kind: NotificationKind, title: &str, description: &str) -> String {
    let tag = match kind {
        NotificationKind::Loading => "...",
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
    };
    format!("[{tag}] {title}: {description}")
}

/// Import the devices in `path`, writing at most `batch_size` at a time and
/// reporting progress through `notifier`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any record is
/// invalid, or any device failed to write.
pub(crate) async fn run_import<N: Notifier>(
    client: DevicesClient,
    path: &Path,
    batch_size: usize,
    notifier: N,
) -> anyhow::Result<()> {
    let importer =
        Importer::new(PathSource::new(path), client, notifier).with_batch_size(batch_size)?;

    let summary = importer.run().await?;

    for failure in &summary.failures {
        eprintln!("  {failure}");
    }
    if summary.has_failures() {
        anyhow::bail!(
            "{} of {} devices failed to import",
            summary.failed,
            summary.total
        );
    }

    Ok(())
}

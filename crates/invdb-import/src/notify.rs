//! User-facing progress and result notifications.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Loading,
    Success,
    Error,
}

/// Fire-and-forget sink for import notifications. Implementations must not
/// block the caller.
pub trait Notifier {
    fn notify(&self, kind: NotificationKind, title: &str, description: &str);
}

/// Emits notifications as log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, description: &str) {
        match kind {
            NotificationKind::Loading => tracing::info!(title, description, "import in progress"),
            NotificationKind::Success => tracing::info!(title, description, "import succeeded"),
            NotificationKind::Error => tracing::error!(title, description, "import failed"),
        }
    }
}

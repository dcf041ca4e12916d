//! Best-effort notification seam.
//!
//! The notification subsystem (push delivery, device tokens) lives outside
//! this crate; the ledger only needs a fire-and-forget hook. Failures are
//! logged and swallowed by the caller, never propagated.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Default notifier: records the notification in the log stream only.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(title, body, "notification");
        Ok(())
    }
}

//! End-of-run notification.
//!
//! Failure to notify is never fatal; the runner logs it and moves on.

mod error;
mod webhook;

pub use error::NotifyError;
pub use webhook::{NotificationPayload, NotifierConfig, WebhookNotifier};

use crate::summary::RunSummary;
use async_trait::async_trait;

/// Receiver of a run's summary.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publishes the summary of a finished run.
    async fn notify(&self, summary: &RunSummary) -> Result<(), NotifyError>;
}

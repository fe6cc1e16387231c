use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notifier delivery failed: {0}")]
    Delivery(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}

/// Outcome of a best-effort history purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Messaging capability consumed by the poll loop.
///
/// Both operations are best effort: the loop logs failures and carries on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str, channel: &str) -> Result<(), NotifyError>;

    async fn purge_history(&self, channel: &str) -> Result<PurgeReport, NotifyError>;
}

/// Notifier that only logs. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str, channel: &str) -> Result<(), NotifyError> {
        info!(channel, text, "dry run: alert not sent");
        Ok(())
    }

    async fn purge_history(&self, channel: &str) -> Result<PurgeReport, NotifyError> {
        info!(channel, "dry run: channel history not purged");
        Ok(PurgeReport::default())
    }
}

use std::sync::Arc;

use alerting::{Notifier, NotifyError, PurgeReport};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct NotifierLog {
    pub sent: Vec<(String, String)>,
    pub send_attempts: usize,
    pub purges: Vec<String>,
}

#[derive(Default, Clone)]
pub struct RecordingNotifier {
    pub log: Arc<Mutex<NotifierLog>>,
    pub fail_sends: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str, channel: &str) -> Result<(), NotifyError> {
        let mut log = self.log.lock().await;
        log.send_attempts += 1;
        if self.fail_sends {
            return Err(NotifyError::Delivery("channel unavailable".into()));
        }
        log.sent.push((channel.to_string(), text.to_string()));
        Ok(())
    }

    async fn purge_history(&self, channel: &str) -> Result<PurgeReport, NotifyError> {
        self.log.lock().await.purges.push(channel.to_string());
        Ok(PurgeReport {
            deleted: 3,
            failed: 0,
        })
    }
}

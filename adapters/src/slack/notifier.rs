use std::time::Duration;

use alerting::{Notifier, NotifyError, PurgeReport};
use async_trait::async_trait;
use tracing::{info, warn};

use super::client::SlackClient;
use super::errors::SlackError;

/// Pause between deletes to stay under the Web API rate limit.
const DELETE_PAUSE: Duration = Duration::from_millis(200);

/// [`Notifier`] over two Slack identities.
pub struct SlackNotifier {
    /// Posts alerts, lists channels.
    bot: SlackClient,
    /// Reads history, deletes messages.
    user: SlackClient,
    delete_pause: Duration,
}

impl SlackNotifier {
    pub fn new(bot: SlackClient, user: SlackClient) -> Self {
        Self {
            bot,
            user,
            delete_pause: DELETE_PAUSE,
        }
    }

    pub fn from_tokens(bot_token: String, user_token: String) -> Result<Self, SlackError> {
        Ok(Self::new(
            SlackClient::new(bot_token)?,
            SlackClient::new(user_token)?,
        ))
    }

    pub fn with_delete_pause(mut self, pause: Duration) -> Self {
        self.delete_pause = pause;
        self
    }

    async fn resolve_channel(&self, channel: &str) -> Result<String, SlackError> {
        let name = channel.trim_start_matches('#');
        self.bot
            .channel_ids()
            .await?
            .remove(name)
            .ok_or_else(|| SlackError::ChannelNotFound(name.to_string()))
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, text: &str, channel: &str) -> Result<(), NotifyError> {
        self.bot.post_message(channel, text).await?;
        Ok(())
    }

    async fn purge_history(&self, channel: &str) -> Result<PurgeReport, NotifyError> {
        let channel_id = self.resolve_channel(channel).await?;
        let stamps = self.user.history(&channel_id).await?;

        let mut report = PurgeReport::default();
        for ts in &stamps {
            match self.user.delete(&channel_id, ts).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(channel, ts = %ts, error = %e, "failed to delete message");
                }
            }
            tokio::time::sleep(self.delete_pause).await;
        }

        info!(
            channel,
            deleted = report.deleted,
            failed = report.failed,
            "channel history purged"
        );
        Ok(report)
    }
}

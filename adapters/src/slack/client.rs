use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::errors::SlackError;
use super::types::{ApiStatus, ChannelList, DeleteMessage, History, PostMessage};

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Responses that carry the `ok` / `error` envelope.
trait Envelope {
    fn status(&self) -> &ApiStatus;
}

impl Envelope for ApiStatus {
    fn status(&self) -> &ApiStatus {
        self
    }
}

impl Envelope for ChannelList {
    fn status(&self) -> &ApiStatus {
        &self.status
    }
}

impl Envelope for History {
    fn status(&self) -> &ApiStatus {
        &self.status
    }
}

/// Minimal Web API client bound to one token.
#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    pub fn new(token: String) -> Result<Self, SlackError> {
        Self::with_base_url(token, DEFAULT_API_URL.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Result<Self, SlackError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    #[instrument(skip(self, text), level = "debug")]
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let body = PostMessage {
            channel: format!("#{}", channel.trim_start_matches('#')),
            text,
            link_names: true,
        };
        let _: ApiStatus = self.post("chat.postMessage", &body).await?;
        Ok(())
    }

    /// Channel name → id for every channel visible to this token.
    pub async fn channel_ids(&self) -> Result<HashMap<String, String>, SlackError> {
        let list: ChannelList = self
            .get(
                "conversations.list",
                &[("types", "public_channel,private_channel"), ("limit", "1000")],
            )
            .await?;

        Ok(list
            .channels
            .into_iter()
            .map(|c| (c.name, c.id))
            .collect())
    }

    /// Timestamps of the latest page of messages in a channel.
    pub async fn history(&self, channel_id: &str) -> Result<Vec<String>, SlackError> {
        let h: History = self
            .get("conversations.history", &[("channel", channel_id)])
            .await?;
        Ok(h.messages.into_iter().map(|m| m.ts).collect())
    }

    pub async fn delete(&self, channel_id: &str, ts: &str) -> Result<(), SlackError> {
        let body = DeleteMessage {
            channel: channel_id,
            ts,
        };
        let _: ApiStatus = self.post("chat.delete", &body).await?;
        Ok(())
    }

    async fn get<T>(&self, method: &'static str, query: &[(&str, &str)]) -> Result<T, SlackError>
    where
        T: DeserializeOwned + Envelope,
    {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, method))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        check(method, resp.json::<T>().await?)
    }

    async fn post<B, T>(&self, method: &'static str, body: &B) -> Result<T, SlackError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Envelope,
    {
        let resp = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        check(method, resp.json::<T>().await?)
    }
}

fn check<T: Envelope>(method: &'static str, resp: T) -> Result<T, SlackError> {
    let status = resp.status();
    if status.ok {
        debug!(method, "slack call ok");
        return Ok(resp);
    }
    Err(SlackError::Api {
        method,
        error: status
            .error
            .clone()
            .unwrap_or_else(|| "unknown_error".to_string()),
    })
}

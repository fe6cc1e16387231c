use alerting::NotifyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("slack api {method} failed: {error}")]
    Api { method: &'static str, error: String },

    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}

impl From<SlackError> for NotifyError {
    fn from(e: SlackError) -> Self {
        match e {
            SlackError::ChannelNotFound(c) => NotifyError::ChannelNotFound(c),
            other => NotifyError::Delivery(other.to_string()),
        }
    }
}

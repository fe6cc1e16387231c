use serde::{Deserialize, Serialize};

/// Envelope fields shared by every Web API response.
#[derive(Debug, Deserialize)]
pub struct ApiStatus {
    pub ok: bool,

    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChannelList {
    #[serde(flatten)]
    pub status: ApiStatus,

    #[serde(default)]
    pub channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub struct History {
    #[serde(flatten)]
    pub status: ApiStatus,

    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Serialize)]
pub struct PostMessage<'a> {
    pub channel: String,
    pub text: &'a str,
    pub link_names: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessage<'a> {
    pub channel: &'a str,
    pub ts: &'a str,
}

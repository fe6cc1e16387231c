//! Slack Web API notifier.
//!
//! Two independently credentialed clients: the bot token posts alerts and
//! lists channels, the user token reads history and deletes messages.

pub mod client;
pub mod errors;
pub mod notifier;
pub mod types;

pub use client::SlackClient;
pub use errors::SlackError;
pub use notifier::SlackNotifier;

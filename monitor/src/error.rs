use thiserror::Error;

/// Conditions that end the poll loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("fatal fetch error: {0}")]
    FatalFetch(String),

    #[error("configuration error: {0}")]
    Config(String),
}

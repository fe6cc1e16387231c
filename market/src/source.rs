use async_trait::async_trait;
use thiserror::Error;

use crate::types::Sample;

/// Failure of a single poll.
///
/// `Transient` covers timeouts, connection resets and 5xx responses: the loop
/// logs it and tries again next cycle. `Fatal` covers rejected credentials and
/// similar conditions that will not heal by retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transient fetch error: {0}")]
    Transient(String),

    #[error("fatal fetch error: {0}")]
    Fatal(String),
}

impl FetchError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Fatal(_))
    }
}

/// Market-data capability consumed by the poll loop.
///
/// Implementations may hold a session (HTTP pool, browser, socket). `close`
/// is called exactly once by the owner on every exit path; after it the
/// source is not polled again.
#[async_trait]
pub trait DataSource: Send {
    /// Fetch the current batch of samples, in table order.
    ///
    /// Either the whole batch or an error; never a partial batch.
    async fn poll(&mut self) -> Result<Vec<Sample>, FetchError>;

    /// Release the underlying session.
    async fn close(&mut self) -> Result<(), FetchError>;
}

use async_trait::async_trait;
use chrono::Utc;
use market::{DataSource, FetchError, Sample};
use tracing::{debug, info};

use super::client::ScannerClient;
use super::parser::parse_samples;
use super::types::ColumnLayout;

/// [`DataSource`] backed by the screener scan endpoint.
///
/// Samples are stamped with the instant the response was received.
pub struct ScannerSource {
    client: ScannerClient,
    layout: ColumnLayout,
    watch_list: Vec<String>,
    closed: bool,
}

impl ScannerSource {
    pub fn new(client: ScannerClient, watch_list: Vec<String>) -> Self {
        Self {
            client,
            layout: ColumnLayout::default(),
            watch_list,
            closed: false,
        }
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }
}

#[async_trait]
impl DataSource for ScannerSource {
    async fn poll(&mut self) -> Result<Vec<Sample>, FetchError> {
        if self.closed {
            return Err(FetchError::Fatal("scanner source is closed".into()));
        }

        let resp = self.client.scan().await?;
        let samples = parse_samples(&resp, self.layout, &self.watch_list, Utc::now());

        debug!(samples = samples.len(), "scanner batch parsed");
        Ok(samples)
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        // Nothing to tear down beyond the connection pool, which drops with the client.
        if !self.closed {
            self.closed = true;
            info!("scanner source closed");
        }
        Ok(())
    }
}

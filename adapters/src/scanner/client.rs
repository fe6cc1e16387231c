use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument};

use super::errors::ScannerError;
use super::types::{RequestParameters, ScanResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ScannerClient {
    http: Client,
    url: String,
    payload: serde_json::Value,
}

impl ScannerClient {
    pub fn new(url: String, params: RequestParameters) -> Result<Self, ScannerError> {
        let headers = header_map(&params)?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url,
            payload: params.payload,
        })
    }

    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    pub async fn scan(&self) -> Result<ScanResponse, ScannerError> {
        let resp = self.http.post(&self.url).json(&self.payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScannerError::Status { status, body });
        }

        let bytes = resp.bytes().await?;
        let parsed: ScanResponse = serde_json::from_slice(&bytes)?;

        debug!(
            rows = parsed.data.len(),
            total = ?parsed.total_count,
            "scanner table fetched"
        );

        Ok(parsed)
    }
}

fn header_map(params: &RequestParameters) -> Result<HeaderMap, ScannerError> {
    let mut headers = HeaderMap::new();
    for (k, v) in &params.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|_| ScannerError::InvalidHeader(k.clone()))?;
        let value = HeaderValue::from_str(v).map_err(|_| ScannerError::InvalidHeader(k.clone()))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

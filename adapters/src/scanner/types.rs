use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::errors::ScannerError;

/// Request template sent on every poll, loaded once at startup.
///
/// ```json
/// { "headers": { "content-type": "application/json" }, "payload": { "columns": [...] } }
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RequestParameters {
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub payload: serde_json::Value,
}

impl RequestParameters {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScannerError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanResponse {
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<u64>,

    #[serde(default)]
    pub data: Vec<ScanRow>,
}

/// One table row: `s` is the exchange-qualified symbol, `d` the requested columns.
#[derive(Debug, Deserialize)]
pub struct ScanRow {
    #[serde(default)]
    pub s: Option<String>,

    #[serde(default)]
    pub d: Vec<serde_json::Value>,
}

/// Positions of the columns of interest inside `ScanRow::d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name: usize,
    pub price: usize,
    pub long_change: usize,
    pub short_change: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            name: 2,
            price: 3,
            long_change: 4,
            short_change: 5,
        }
    }
}

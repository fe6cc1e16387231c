use chrono::{DateTime, Utc};
use serde::Serialize;

/// Asset identifier as it appears in the watch-list (e.g. `BTCUSDT`).
pub type AssetId = String;

/// One observation of an asset, as delivered by a data source.
///
/// The two change fields are percentages already computed by the vendor;
/// either may be missing on any given poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub asset: AssetId,
    pub price: f64,
    pub ts: DateTime<Utc>,

    /// Vendor short-horizon (≈5 min) change, percent.
    pub short_change: Option<f64>,

    /// Vendor long-horizon (≈1 h) change, percent.
    pub long_change: Option<f64>,
}

impl Sample {
    pub fn new(asset: impl Into<AssetId>, price: f64, ts: DateTime<Utc>) -> Self {
        Self {
            asset: asset.into(),
            price,
            ts,
            short_change: None,
            long_change: None,
        }
    }

    pub fn with_short_change(mut self, pct: f64) -> Self {
        self.short_change = Some(pct);
        self
    }

    pub fn with_long_change(mut self, pct: f64) -> Self {
        self.long_change = Some(pct);
        self
    }
}

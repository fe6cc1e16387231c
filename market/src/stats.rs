//! Trailing moving-average deviation.
//!
//! For the latest sample of an asset the engine computes
//!
//! ```text
//! trailing_mean = mean(price[latest - n ..= latest - 1])
//! signed_pct    = (price[latest] - trailing_mean) / trailing_mean * 100
//! pct_deviation = |signed_pct|
//! ```
//!
//! where `n` is the rolling window size. The mean is shifted by one sample so
//! the current price never feeds its own baseline. Both percentages are
//! rounded to [`DECIMALS`] places so threshold comparisons are deterministic.

use std::collections::HashMap;

use tracing::warn;

use crate::error::MarketError;
use crate::rolling_window::{SampleStore, SampleWindow};
use crate::types::{AssetId, Sample};

/// Decimal places kept on computed percentages.
pub const DECIMALS: i32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviationRecord {
    pub current_price: f64,
    pub trailing_mean: f64,

    /// Signed change vs the baseline; `> 0` is an increase.
    pub signed_pct: f64,

    /// `|signed_pct|`, the value compared against thresholds.
    pub pct_deviation: f64,
}

/// Outcome of a deviation computation.
///
/// `InsufficientData` is a normal warm-up state, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Deviation {
    Ready(DeviationRecord),
    InsufficientData { have: usize, need: usize },
}

impl Deviation {
    pub fn record(&self) -> Option<&DeviationRecord> {
        match self {
            Deviation::Ready(r) => Some(r),
            Deviation::InsufficientData { .. } => None,
        }
    }
}

/// Compute the deviation of the latest sample from its shifted trailing mean.
pub fn compute_deviation(
    window: &SampleWindow,
    rolling_window_size: usize,
) -> Result<Deviation, MarketError> {
    let n = rolling_window_size.max(1);
    let need = n + 1;

    let Some(latest) = window.latest() else {
        return Ok(Deviation::InsufficientData { have: 0, need });
    };
    if window.len() < need {
        return Ok(Deviation::InsufficientData {
            have: window.len(),
            need,
        });
    }

    // n samples immediately preceding the latest one
    let sum: f64 = window.iter().rev().skip(1).take(n).map(|s| s.price).sum();
    let trailing_mean = sum / n as f64;

    if trailing_mean == 0.0 {
        return Err(MarketError::DegenerateBaseline {
            asset: latest.asset.clone(),
        });
    }

    let signed_pct = round_to(
        (latest.price - trailing_mean) / trailing_mean * 100.0,
        DECIMALS,
    );

    Ok(Deviation::Ready(DeviationRecord {
        current_price: latest.price,
        trailing_mean,
        signed_pct,
        pct_deviation: signed_pct.abs(),
    }))
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Where a short-horizon signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortSource {
    /// Deviation from the trailing mean over the local window.
    Computed,
    /// Vendor short-horizon change, used while the window warms up.
    Vendor,
}

/// Per-asset signals for one cycle, ready for threshold evaluation.
///
/// Either horizon may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSignals {
    pub asset: AssetId,

    /// Signed short-horizon change, percent.
    pub short: Option<f64>,
    pub short_source: Option<ShortSource>,

    /// Signed long-horizon change, percent (vendor supplied).
    pub long: Option<f64>,
}

/// Turns the sample store into per-asset horizon signals.
#[derive(Debug, Clone)]
pub struct StatsEngine {
    rolling_window_size: usize,
}

impl StatsEngine {
    pub fn new(rolling_window_size: usize) -> Self {
        Self {
            rolling_window_size: rolling_window_size.max(1),
        }
    }

    pub fn rolling_window_size(&self) -> usize {
        self.rolling_window_size
    }

    /// Signals for every asset in `current`, in the order given.
    ///
    /// `current` is the batch of samples accepted this cycle. Duplicate assets
    /// keep their first position but read the vendor fields of their last
    /// occurrence, which is also the sample at the back of the window. An
    /// asset whose baseline is degenerate is skipped entirely for this cycle.
    pub fn signals(&self, store: &SampleStore, current: &[Sample]) -> Vec<AssetSignals> {
        let mut order: Vec<&str> = Vec::with_capacity(current.len());
        let mut latest: HashMap<&str, &Sample> = HashMap::with_capacity(current.len());
        for sample in current {
            if latest.insert(sample.asset.as_str(), sample).is_none() {
                order.push(sample.asset.as_str());
            }
        }

        let mut out = Vec::with_capacity(order.len());

        for sample in order.into_iter().filter_map(|asset| latest.get(asset).copied()) {
            let deviation = match store.snapshot(&sample.asset) {
                Some(window) => compute_deviation(window, self.rolling_window_size),
                None => Ok(Deviation::InsufficientData {
                    have: 0,
                    need: self.rolling_window_size + 1,
                }),
            };

            let deviation = match deviation {
                Ok(d) => d,
                Err(e) => {
                    warn!(asset = %sample.asset, error = %e, "skipping asset this cycle");
                    continue;
                }
            };

            let (short, short_source) = match (deviation.record(), sample.short_change) {
                (Some(r), _) => (Some(r.signed_pct), Some(ShortSource::Computed)),
                (None, Some(v)) => (Some(round_to(v, DECIMALS)), Some(ShortSource::Vendor)),
                (None, None) => (None, None),
            };

            out.push(AssetSignals {
                asset: sample.asset.clone(),
                short,
                short_source,
                long: sample.long_change.map(|v| round_to(v, DECIMALS)),
            });
        }

        out
    }
}

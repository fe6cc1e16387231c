use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::AssetId;

/// Per-asset failures. None of these abort a poll cycle; the caller drops
/// the offending sample or skips the asset and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("out-of-order sample for {asset}: {offered} precedes last recorded {last}")]
    CapacityInvariantViolation {
        asset: AssetId,
        last: DateTime<Utc>,
        offered: DateTime<Utc>,
    },

    #[error("trailing mean for {asset} is zero")]
    DegenerateBaseline { asset: AssetId },
}

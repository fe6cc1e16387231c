use tracing::{Level, Span};

use super::TraceId;

/// Root span for one poll cycle.
pub fn cycle_span(cycle: u64, trace_id: &TraceId) -> Span {
    tracing::span!(
        Level::INFO,
        "cycle",
        cycle,
        trace_id = %trace_id
    )
}

/// Child span for per-asset work (inherits trace_id from the cycle span)
pub fn asset_span(asset: &str) -> Span {
    tracing::span!(Level::DEBUG, "asset", asset = %asset)
}

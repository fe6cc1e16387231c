//! Threshold and breach checks.

use chrono::{DateTime, NaiveTime, Utc};
use market::AssetSignals;

use crate::types::{AlertCandidate, EvaluatorConfig, Horizon};

/// `true` when `t` lies in `[start, end)`, wrapping past midnight when
/// `start > end`.
pub fn time_in_window(t: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        start <= t && t < end
    } else {
        t >= start || t < end
    }
}

/// Whether `now` falls in the configured quiet hours, in local time.
pub fn in_quiet_hours(cfg: &EvaluatorConfig, now: DateTime<Utc>) -> bool {
    let Some(quiet) = cfg.quiet_hours else {
        return false;
    };
    let local = cfg.local_zone.local_time(now);
    quiet.contains(local)
}

/// Threshold in force for `horizon`, with the quiet-hours bump applied when `quiet`.
pub fn effective_threshold(cfg: &EvaluatorConfig, horizon: Horizon, quiet: bool) -> f64 {
    let base = cfg.base_threshold(horizon);
    match (quiet, cfg.quiet_hours) {
        (true, Some(q)) => base + q.bump,
        _ => base,
    }
}

/// Signed value of `horizon`'s signal for one asset, if present.
pub fn signal_for(signals: &AssetSignals, horizon: Horizon) -> Option<f64> {
    match horizon {
        Horizon::Short => signals.short,
        Horizon::Long => signals.long,
    }
}

/// Breach test: magnitude strictly above the threshold.
pub fn is_breach(signed_pct: f64, threshold: f64) -> bool {
    signed_pct.abs() > threshold
}

/// All assets breaching `horizon`, in input order. Cooldowns are not consulted.
pub fn breaches(signals: &[AssetSignals], horizon: Horizon, threshold: f64) -> Vec<AlertCandidate> {
    signals
        .iter()
        .filter_map(|s| {
            let v = signal_for(s, horizon)?;
            is_breach(v, threshold).then(|| AlertCandidate::new(s.asset.clone(), horizon, v))
        })
        .collect()
}

//! Shared types used by the alerting subsystem.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use chrono_tz::Tz;
use market::AssetId;

/// Time span a percentage change is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    /// ≈5 minutes, signal computed from the local rolling window.
    Short,
    /// ≈1 hour, signal supplied by the vendor.
    Long,
}

impl Horizon {
    pub fn other(self) -> Self {
        match self {
            Horizon::Short => Horizon::Long,
            Horizon::Long => Horizon::Short,
        }
    }

    /// Header line label used in alert messages.
    pub fn label(self) -> &'static str {
        match self {
            Horizon::Short => "LAST 5 MINUTES",
            Horizon::Long => "LAST 1 HOUR",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Short => f.write_str("short"),
            Horizon::Long => f.write_str("long"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Zero counts as a decrease.
    pub fn of(signed_pct: f64) -> Self {
        if signed_pct > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// One asset breaching one horizon, eligible to be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub asset: AssetId,
    pub horizon: Horizon,
    pub signed_pct: f64,
    pub direction: Direction,
}

impl AlertCandidate {
    pub fn new(asset: impl Into<AssetId>, horizon: Horizon, signed_pct: f64) -> Self {
        Self {
            asset: asset.into(),
            horizon,
            signed_pct,
            direction: Direction::of(signed_pct),
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.signed_pct.abs()
    }
}

/// The single batch emitted in a cycle. All candidates share one horizon and
/// keep the order of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertBatch {
    pub horizon: Horizon,
    pub candidates: Vec<AlertCandidate>,
    pub fired_at: DateTime<Utc>,

    /// Threshold in force when the batch was decided (quiet-hours bump included).
    pub threshold: f64,
}

impl AlertBatch {
    pub fn message(&self) -> String {
        crate::format::render_batch(self)
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.asset.as_str())
    }
}

/// Whether firing one horizon also resets the other horizon's cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CooldownCoupling {
    #[default]
    Independent,
    /// Any fire resets both horizons for that asset.
    Coupled,
}

/// Local-time window during which thresholds are raised by `bump`.
///
/// `start` is inclusive, `end` exclusive. A window whose start is after its
/// end wraps past midnight; `start == end` is an empty window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuietHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub bump: f64,
}

impl QuietHours {
    pub fn contains(&self, local: NaiveTime) -> bool {
        crate::eligibility::time_in_window(local, self.start, self.end)
    }
}

/// Operator's clock: a named zone that follows DST, or a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocalZone {
    /// Wall-clock time at `now`.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveTime {
        match self {
            LocalZone::Named(tz) => now.with_timezone(tz).time(),
            LocalZone::Fixed(offset) => now.with_timezone(offset).time(),
        }
    }
}

impl From<FixedOffset> for LocalZone {
    fn from(offset: FixedOffset) -> Self {
        LocalZone::Fixed(offset)
    }
}

impl From<Tz> for LocalZone {
    fn from(tz: Tz) -> Self {
        LocalZone::Named(tz)
    }
}

/// Configuration knobs for the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Base threshold for the short horizon, percentage points.
    pub short_threshold: f64,

    /// Base threshold for the long horizon, percentage points.
    pub long_threshold: f64,

    /// Minimum time between two short alerts for the same asset.
    pub short_cooldown: Duration,

    /// Minimum time between two long alerts for the same asset.
    pub long_cooldown: Duration,

    pub coupling: CooldownCoupling,

    pub quiet_hours: Option<QuietHours>,

    /// Operator's local zone, used to place `now` against quiet hours.
    pub local_zone: LocalZone,
}

impl EvaluatorConfig {
    /// Short cooldown derived from the alert repeat cycle: `round(secs / 3)`.
    ///
    /// The poll loop samples several times per repeat cycle, so one breach
    /// is reported at most once per third of it.
    pub fn short_cooldown_from_repeat_cycle(repeat_cycle_secs: u64) -> Duration {
        Duration::seconds((repeat_cycle_secs as f64 / 3.0).round() as i64)
    }

    pub fn cooldown(&self, horizon: Horizon) -> Duration {
        match horizon {
            Horizon::Short => self.short_cooldown,
            Horizon::Long => self.long_cooldown,
        }
    }

    pub fn base_threshold(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::Short => self.short_threshold,
            Horizon::Long => self.long_threshold,
        }
    }
}

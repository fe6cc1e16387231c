//! Per-asset cooldown bookkeeping.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use market::AssetId;

use crate::types::Horizon;

/// Last fire instant per horizon for a single asset.
///
/// `None` means "never fired", which behaves like an instant far enough in
/// the past that the first breach is always eligible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownState {
    pub short: Option<DateTime<Utc>>,
    pub long: Option<DateTime<Utc>>,
}

impl CooldownState {
    pub fn get(&self, horizon: Horizon) -> Option<DateTime<Utc>> {
        match horizon {
            Horizon::Short => self.short,
            Horizon::Long => self.long,
        }
    }

    fn set(&mut self, horizon: Horizon, at: DateTime<Utc>) {
        match horizon {
            Horizon::Short => self.short = Some(at),
            Horizon::Long => self.long = Some(at),
        }
    }
}

/// Owner of every (asset, horizon) cooldown.
///
/// State only changes through [`CooldownTracker::mark_fired`].
#[derive(Debug, Default)]
pub struct CooldownTracker {
    inner: HashMap<AssetId, CooldownState>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff at least `cooldown` has elapsed since the last fire.
    pub fn is_eligible(
        &self,
        asset: &str,
        horizon: Horizon,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> bool {
        match self.last_fired_at(asset, horizon) {
            None => true,
            Some(last) => now.signed_duration_since(last) >= cooldown,
        }
    }

    pub fn mark_fired(&mut self, asset: &str, horizon: Horizon, now: DateTime<Utc>) {
        self.inner
            .entry(asset.to_string())
            .or_default()
            .set(horizon, now);
    }

    pub fn last_fired_at(&self, asset: &str, horizon: Horizon) -> Option<DateTime<Utc>> {
        self.inner.get(asset).and_then(|s| s.get(horizon))
    }

    pub fn state(&self, asset: &str) -> CooldownState {
        self.inner.get(asset).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_fired_is_eligible() {
        let tracker = CooldownTracker::new();
        assert!(tracker.is_eligible("BTC", Horizon::Short, t0(), Duration::hours(10)));
        assert_eq!(tracker.last_fired_at("BTC", Horizon::Short), None);
    }

    #[test]
    fn cooldown_boundaries() {
        let mut tracker = CooldownTracker::new();
        let cd = Duration::seconds(300);
        tracker.mark_fired("BTC", Horizon::Short, t0());

        let just_before = t0() + cd - Duration::seconds(1);
        let exactly = t0() + cd;
        let just_after = t0() + cd + Duration::seconds(1);

        assert!(!tracker.is_eligible("BTC", Horizon::Short, just_before, cd));
        assert!(tracker.is_eligible("BTC", Horizon::Short, exactly, cd));
        assert!(tracker.is_eligible("BTC", Horizon::Short, just_after, cd));
    }

    #[test]
    fn horizons_and_assets_are_tracked_separately() {
        let mut tracker = CooldownTracker::new();
        let cd = Duration::seconds(60);
        tracker.mark_fired("BTC", Horizon::Short, t0());

        assert!(tracker.is_eligible("BTC", Horizon::Long, t0(), cd));
        assert!(tracker.is_eligible("ETH", Horizon::Short, t0(), cd));
        assert!(!tracker.is_eligible("BTC", Horizon::Short, t0(), cd));
    }

    #[test]
    fn mark_fired_overwrites() {
        let mut tracker = CooldownTracker::new();
        tracker.mark_fired("BTC", Horizon::Long, t0());
        let later = t0() + Duration::minutes(90);
        tracker.mark_fired("BTC", Horizon::Long, later);

        assert_eq!(tracker.last_fired_at("BTC", Horizon::Long), Some(later));
        assert_eq!(tracker.state("BTC").short, None);
    }

    proptest! {
        #[test]
        fn is_eligible_is_idempotent(
            fired_offset in -10_000i64..10_000,
            now_offset in -10_000i64..10_000,
            cd_secs in 0i64..5_000,
            fired in any::<bool>(),
        ) {
            let mut tracker = CooldownTracker::new();
            if fired {
                tracker.mark_fired("X", Horizon::Short, t0() + Duration::seconds(fired_offset));
            }
            let now = t0() + Duration::seconds(now_offset);
            let cd = Duration::seconds(cd_secs);

            let first = tracker.is_eligible("X", Horizon::Short, now, cd);
            let second = tracker.is_eligible("X", Horizon::Short, now, cd);
            prop_assert_eq!(first, second);
        }
    }
}

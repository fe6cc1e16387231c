//! Once-a-day purge of the alert channel.
//!
//! The purge window is `[purge_at, reset_at)` in local time. The first cycle
//! that lands inside the window purges; later cycles inside the same window
//! hold. Leaving the window re-arms the purge for the next day.

use chrono::NaiveTime;

use crate::eligibility::time_in_window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeAction {
    /// Outside the window; evaluate alerts as usual.
    Idle,
    /// First cycle in the window: purge the channel now.
    Purge,
    /// Inside the window, already purged today.
    Hold,
}

impl PurgeAction {
    /// Alert evaluation is skipped for cycles inside the purge window.
    pub fn suppresses_alerts(self) -> bool {
        !matches!(self, PurgeAction::Idle)
    }
}

#[derive(Debug, Clone)]
pub struct DailyPurge {
    purge_at: NaiveTime,
    reset_at: NaiveTime,
    purged: bool,
}

impl DailyPurge {
    pub fn new(purge_at: NaiveTime, reset_at: NaiveTime) -> Self {
        Self {
            purge_at,
            reset_at,
            purged: false,
        }
    }

    pub fn step(&mut self, local: NaiveTime) -> PurgeAction {
        if !time_in_window(local, self.purge_at, self.reset_at) {
            self.purged = false;
            return PurgeAction::Idle;
        }

        if self.purged {
            PurgeAction::Hold
        } else {
            self.purged = true;
            PurgeAction::Purge
        }
    }

    pub fn purged_today(&self) -> bool {
        self.purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn midnight_purge() -> DailyPurge {
        DailyPurge::new(hms(0, 0, 0), hms(0, 1, 0))
    }

    #[test]
    fn purges_exactly_once_per_window() {
        let mut p = midnight_purge();

        assert_eq!(p.step(hms(23, 59, 50)), PurgeAction::Idle);
        assert_eq!(p.step(hms(0, 0, 5)), PurgeAction::Purge);
        assert_eq!(p.step(hms(0, 0, 20)), PurgeAction::Hold);
        assert_eq!(p.step(hms(0, 0, 59)), PurgeAction::Hold);
        assert!(p.purged_today());

        assert_eq!(p.step(hms(0, 1, 0)), PurgeAction::Idle);
        assert!(!p.purged_today());
    }

    #[test]
    fn rearms_for_the_next_day() {
        let mut p = midnight_purge();
        assert_eq!(p.step(hms(0, 0, 10)), PurgeAction::Purge);
        assert_eq!(p.step(hms(12, 0, 0)), PurgeAction::Idle);
        assert_eq!(p.step(hms(0, 0, 3)), PurgeAction::Purge);
    }

    #[test]
    fn only_idle_lets_alerts_through() {
        assert!(!PurgeAction::Idle.suppresses_alerts());
        assert!(PurgeAction::Purge.suppresses_alerts());
        assert!(PurgeAction::Hold.suppresses_alerts());
    }
}

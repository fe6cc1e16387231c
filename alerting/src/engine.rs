//! The anomaly evaluator.
//!
//! For each poll cycle it:
//!   1. Resolves the effective thresholds (quiet hours checked once per cycle).
//!   2. Collects short-horizon breaches that are out of cooldown.
//!   3. If there are none, collects long-horizon breaches instead.
//!   4. Marks cooldowns for the emitted batch and hands it back for sending.
//!
//! Short-horizon alerts take precedence: a cycle emits at most one batch.

use chrono::{DateTime, Utc};
use market::AssetSignals;
use tracing::{debug, info};

use crate::eligibility::{breaches, effective_threshold, in_quiet_hours};
use crate::state::CooldownTracker;
use crate::types::{AlertBatch, AlertCandidate, CooldownCoupling, EvaluatorConfig, Horizon};

pub struct AnomalyEvaluator {
    cfg: EvaluatorConfig,
    cooldowns: CooldownTracker,
}

impl AnomalyEvaluator {
    pub fn new(cfg: EvaluatorConfig) -> Self {
        Self {
            cfg,
            cooldowns: CooldownTracker::new(),
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.cfg
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Evaluate one cycle's signals at `now`.
    ///
    /// Returns the batch to send, if any. Cooldowns for every asset in the
    /// returned batch are already marked: the caller sends after this returns
    /// and does not roll back on delivery failure.
    pub fn evaluate(&mut self, signals: &[AssetSignals], now: DateTime<Utc>) -> Option<AlertBatch> {
        let quiet = in_quiet_hours(&self.cfg, now);

        for horizon in [Horizon::Short, Horizon::Long] {
            let threshold = effective_threshold(&self.cfg, horizon, quiet);
            let eligible = self.eligible_breaches(signals, horizon, threshold, now);

            debug!(
                %horizon,
                threshold,
                quiet,
                eligible = eligible.len(),
                "horizon evaluated"
            );

            if !eligible.is_empty() {
                return Some(self.fire(horizon, eligible, threshold, now));
            }
        }

        None
    }

    fn eligible_breaches(
        &self,
        signals: &[AssetSignals],
        horizon: Horizon,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Vec<AlertCandidate> {
        let cooldown = self.cfg.cooldown(horizon);

        breaches(signals, horizon, threshold)
            .into_iter()
            .filter(|c| {
                let ok = self.cooldowns.is_eligible(&c.asset, horizon, now, cooldown);
                if !ok {
                    debug!(asset = %c.asset, %horizon, "breach suppressed by cooldown");
                }
                ok
            })
            .collect()
    }

    fn fire(
        &mut self,
        horizon: Horizon,
        candidates: Vec<AlertCandidate>,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> AlertBatch {
        for c in &candidates {
            self.cooldowns.mark_fired(&c.asset, horizon, now);
            if self.cfg.coupling == CooldownCoupling::Coupled {
                self.cooldowns.mark_fired(&c.asset, horizon.other(), now);
            }
        }

        info!(
            %horizon,
            threshold,
            count = candidates.len(),
            "alert batch fired"
        );

        AlertBatch {
            horizon,
            candidates,
            fired_at: now,
            threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn t0() -> DateTime<Utc> {
        // 12:00 local at +03:00, well outside quiet hours
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn cfg(coupling: CooldownCoupling) -> EvaluatorConfig {
        EvaluatorConfig {
            short_threshold: 5.0,
            long_threshold: 10.0,
            short_cooldown: Duration::seconds(300),
            long_cooldown: Duration::seconds(3615),
            coupling,
            quiet_hours: None,
            local_zone: FixedOffset::east_opt(3 * 3600).unwrap().into(),
        }
    }

    fn sig(asset: &str, short: Option<f64>, long: Option<f64>) -> AssetSignals {
        AssetSignals {
            asset: asset.into(),
            short,
            short_source: None,
            long,
        }
    }

    #[test]
    fn nothing_breaching_emits_nothing() {
        let mut ev = AnomalyEvaluator::new(cfg(CooldownCoupling::Independent));
        let out = ev.evaluate(&[sig("BTC", Some(1.0), Some(-2.0))], t0());
        assert!(out.is_none());
    }

    #[test]
    fn short_batch_wins_over_long() {
        let mut ev = AnomalyEvaluator::new(cfg(CooldownCoupling::Independent));
        let signals = [sig("BTC", Some(6.0), None), sig("ETH", None, Some(-12.0))];

        let batch = ev.evaluate(&signals, t0()).unwrap();
        assert_eq!(batch.horizon, Horizon::Short);
        assert_eq!(batch.assets().collect::<Vec<_>>(), vec!["BTC"]);

        // ETH's long breach was not emitted, so its cooldown is untouched
        assert_eq!(ev.cooldowns().last_fired_at("ETH", Horizon::Long), None);
    }

    #[test]
    fn long_batch_when_no_short_is_eligible() {
        let mut ev = AnomalyEvaluator::new(cfg(CooldownCoupling::Independent));
        let batch = ev
            .evaluate(&[sig("ETH", Some(0.2), Some(-12.0))], t0())
            .unwrap();

        assert_eq!(batch.horizon, Horizon::Long);
        let c = &batch.candidates[0];
        assert_eq!(c.direction, Direction::Down);
        assert_eq!(c.magnitude(), 12.0);
    }

    #[test]
    fn short_in_cooldown_lets_long_through() {
        let mut ev = AnomalyEvaluator::new(cfg(CooldownCoupling::Independent));
        let first = ev.evaluate(&[sig("BTC", Some(7.0), None)], t0()).unwrap();
        assert_eq!(first.horizon, Horizon::Short);

        let later = t0() + Duration::seconds(30);
        let second = ev
            .evaluate(&[sig("BTC", Some(7.0), Some(11.0))], later)
            .unwrap();
        assert_eq!(second.horizon, Horizon::Long);
    }

    #[test]
    fn coupled_cooldowns_reset_both_horizons() {
        let mut ev = AnomalyEvaluator::new(cfg(CooldownCoupling::Coupled));
        ev.evaluate(&[sig("BTC", Some(7.0), None)], t0()).unwrap();

        assert_eq!(ev.cooldowns().last_fired_at("BTC", Horizon::Long), Some(t0()));

        let later = t0() + Duration::seconds(30);
        assert!(ev
            .evaluate(&[sig("BTC", Some(7.0), Some(11.0))], later)
            .is_none());
    }

    #[test]
    fn independent_cooldowns_leave_other_horizon_alone() {
        let mut ev = AnomalyEvaluator::new(cfg(CooldownCoupling::Independent));
        ev.evaluate(&[sig("BTC", Some(7.0), None)], t0()).unwrap();
        assert_eq!(ev.cooldowns().last_fired_at("BTC", Horizon::Long), None);
    }

    #[test]
    fn only_out_of_cooldown_assets_are_in_the_batch() {
        let mut ev = AnomalyEvaluator::new(cfg(CooldownCoupling::Independent));
        ev.evaluate(&[sig("BTC", Some(7.0), None)], t0()).unwrap();

        let later = t0() + Duration::seconds(60);
        let batch = ev
            .evaluate(
                &[sig("BTC", Some(8.0), None), sig("ETH", Some(-9.0), None)],
                later,
            )
            .unwrap();

        assert_eq!(batch.assets().collect::<Vec<_>>(), vec!["ETH"]);
        assert_eq!(batch.fired_at, later);
    }
}

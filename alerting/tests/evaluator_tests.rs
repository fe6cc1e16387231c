use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use alerting::{
    AnomalyEvaluator, CooldownCoupling, Direction, EvaluatorConfig, Horizon, QuietHours,
};
use market::{AssetSignals, Sample, SampleStore, StatsEngine};

const WINDOW: usize = 5;

fn offset() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap()
}

/// 14:00 local.
fn afternoon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 10, 11, 0, 0).unwrap()
}

/// 03:00 local, inside 01:30-06:00.
fn night() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap()
}

fn config(threshold: f64, quiet: Option<QuietHours>) -> EvaluatorConfig {
    EvaluatorConfig {
        short_threshold: threshold,
        long_threshold: threshold,
        short_cooldown: EvaluatorConfig::short_cooldown_from_repeat_cycle(900),
        long_cooldown: Duration::seconds(3615),
        coupling: CooldownCoupling::Independent,
        quiet_hours: quiet,
        local_zone: offset().into(),
    }
}

fn quiet_hours(bump: f64) -> Option<QuietHours> {
    Some(QuietHours {
        start: NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
        end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        bump,
    })
}

/// Ingest `prices` for `asset`, one per 15 s ending at `end`, and return the
/// signals for the last sample.
fn signals_after(
    store: &mut SampleStore,
    asset: &str,
    prices: &[f64],
    end: DateTime<Utc>,
) -> Vec<AssetSignals> {
    let n = prices.len() as i64;
    let mut last = None;
    for (i, p) in prices.iter().enumerate() {
        let ts = end - Duration::seconds(15 * (n - 1 - i as i64));
        let s = Sample::new(asset, *p, ts);
        store.ingest(s.clone()).unwrap();
        last = Some(s);
    }
    StatsEngine::new(WINDOW).signals(store, &[last.unwrap()])
}

fn short_signal(asset: &str, v: f64) -> AssetSignals {
    AssetSignals {
        asset: asset.into(),
        short: Some(v),
        short_source: None,
        long: None,
    }
}

#[test]
fn jump_over_flat_baseline_fires_once_then_is_suppressed() {
    let mut store = SampleStore::new(WINDOW);
    let mut ev = AnomalyEvaluator::new(config(5.0, None));

    let t = afternoon();
    let signals = signals_after(
        &mut store,
        "BTCUSDT",
        &[100.0, 100.0, 100.0, 100.0, 100.0, 106.0],
        t,
    );
    assert_eq!(signals[0].short, Some(6.0));

    let batch = ev.evaluate(&signals, t).expect("breach should fire");
    assert_eq!(batch.horizon, Horizon::Short);
    assert_eq!(batch.candidates[0].direction, Direction::Up);
    assert_eq!(
        ev.cooldowns().last_fired_at("BTCUSDT", Horizon::Short),
        Some(t)
    );

    let again = ev.evaluate(&signals, t + Duration::seconds(1));
    assert!(again.is_none());
}

#[test]
fn vendor_long_change_fires_long_batch_when_short_is_quiet() {
    let mut ev = AnomalyEvaluator::new(config(10.0, None));
    let signals = vec![AssetSignals {
        asset: "ETHUSDT".into(),
        short: Some(0.4),
        short_source: None,
        long: Some(-12.0),
    }];

    let batch = ev.evaluate(&signals, afternoon()).unwrap();
    assert_eq!(batch.horizon, Horizon::Long);
    assert_eq!(batch.candidates[0].direction, Direction::Down);
    assert_eq!(batch.candidates[0].magnitude(), 12.0);
    assert!(batch.message().contains("%12.0 decreased :arrow_down:"));
}

#[test]
fn vendor_long_change_waits_while_a_short_batch_is_eligible() {
    let mut ev = AnomalyEvaluator::new(config(10.0, None));
    let signals = vec![
        short_signal("BTCUSDT", 11.0),
        AssetSignals {
            asset: "ETHUSDT".into(),
            short: None,
            short_source: None,
            long: Some(-12.0),
        },
    ];

    let first = ev.evaluate(&signals, afternoon()).unwrap();
    assert_eq!(first.horizon, Horizon::Short);

    // BTC's short breach is now cooling down, so the long batch gets the slot
    let second = ev
        .evaluate(&signals, afternoon() + Duration::seconds(15))
        .unwrap();
    assert_eq!(second.horizon, Horizon::Long);
    assert_eq!(second.assets().collect::<Vec<_>>(), vec!["ETHUSDT"]);
}

#[test]
fn quiet_hours_raise_the_bar() {
    let signals = vec![short_signal("SOLUSDT", 3.0)];

    let mut ev = AnomalyEvaluator::new(config(1.0, quiet_hours(5.0)));
    assert!(ev.evaluate(&signals, night()).is_none());

    let mut ev = AnomalyEvaluator::new(config(1.0, quiet_hours(5.0)));
    let batch = ev.evaluate(&signals, afternoon()).unwrap();
    assert_eq!(batch.threshold, 1.0);
}

#[test]
fn cooldown_expires_on_schedule() {
    let mut ev = AnomalyEvaluator::new(config(2.0, None));
    let cd = ev.config().short_cooldown;
    let signals = vec![short_signal("BTCUSDT", -4.0)];
    let t0 = afternoon();

    assert!(ev.evaluate(&signals, t0).is_some());
    assert!(ev.evaluate(&signals, t0 + cd - Duration::seconds(1)).is_none());
    assert!(ev.evaluate(&signals, t0 + cd + Duration::seconds(1)).is_some());
}

//! The poll loop.
//!
//! One cycle:
//! (daily purge) → Source → SampleStore → (purge gate) → StatsEngine → AnomalyEvaluator → Notifier
//!
//! Cycles run strictly one after another with a fixed sleep in between.
//! Per-asset problems are logged and skipped; only a fatal fetch error (or
//! too many transient ones in a row) ends the loop. The source is closed on
//! every way out.

use std::future::Future;
use std::time::Duration;

use alerting::eligibility::{effective_threshold, in_quiet_hours};
use alerting::{
    AlertBatch, AnomalyEvaluator, DailyPurge, Horizon, Notifier, PurgeAction, PurgeReport,
};
use chrono::{DateTime, Utc};
use common::logger::{TraceId, asset_span, cycle_span, warn_if_slow};
use market::{DataSource, FetchError, Sample, SampleStore, StatsEngine};
use tracing::{Instrument, debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::MonitorError;
use crate::snapshot_log::SnapshotLog;

const FETCH_BUDGET: Duration = Duration::from_secs(10);
const SEND_BUDGET: Duration = Duration::from_secs(5);
const PURGE_BUDGET: Duration = Duration::from_secs(60);

/// What a single cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// The fetch failed transiently; only the purge step ran.
    pub fetch_failed: bool,
    pub accepted: usize,
    pub dropped: usize,
    pub purge: Option<PurgeAction>,
    pub purge_report: Option<PurgeReport>,
    pub alert: Option<AlertBatch>,
    pub delivered: bool,
}

pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    store: SampleStore,
    stats: StatsEngine,
    evaluator: AnomalyEvaluator,
    purge: DailyPurge,
    snapshot_log: Option<SnapshotLog>,

    channel: String,
    poll_interval: Duration,
    max_consecutive_failures: u32,
    consecutive_failures: u32,
    cycle: u64,
}

impl<S, N> Monitor<S, N>
where
    S: DataSource,
    N: Notifier,
{
    pub fn new(cfg: &AppConfig, source: S, notifier: N) -> Self {
        let n = cfg.rolling_window_size();

        Self {
            source,
            notifier,
            store: SampleStore::new(n),
            stats: StatsEngine::new(n),
            evaluator: AnomalyEvaluator::new(cfg.evaluator_config()),
            purge: DailyPurge::new(cfg.purge_at, cfg.purge_reset_at),
            snapshot_log: None,
            channel: cfg.slack_channel.clone(),
            poll_interval: cfg.poll_interval,
            max_consecutive_failures: cfg.max_consecutive_fetch_failures.max(1),
            consecutive_failures: 0,
            cycle: 0,
        }
    }

    pub fn with_snapshot_log(mut self, log: SnapshotLog) -> Self {
        self.snapshot_log = Some(log);
        self
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn evaluator(&self) -> &AnomalyEvaluator {
        &self.evaluator
    }

    /// Runs until ctrl-c or a fatal fetch error.
    pub async fn run(self) -> Result<(), MonitorError> {
        self.run_until(shutdown_signal()).await
    }

    /// Runs until `shutdown` resolves or a fatal fetch error.
    ///
    /// `shutdown` is raced against both the cycle and the sleep. The source
    /// is closed exactly once before returning.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), MonitorError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            channel = %self.channel,
            every_s = self.poll_interval.as_secs(),
            window = self.store.rolling_window_size(),
            "monitor started"
        );

        let result = loop {
            let cycle = tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    break Ok(());
                }
                r = self.run_cycle(Utc::now()) => r,
            };

            if let Err(e) = cycle {
                error!(error = %e, "poll loop terminated");
                break Err(e);
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    break Ok(());
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        };

        if let Err(e) = self.source.close().await {
            warn!(error = %e, "failed to close data source");
        }

        result
    }

    /// One full cycle evaluated at `now`.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleReport, MonitorError> {
        self.cycle += 1;
        let span = cycle_span(self.cycle, &TraceId::new());
        self.cycle_inner(now).instrument(span).await
    }

    async fn cycle_inner(&mut self, now: DateTime<Utc>) -> Result<CycleReport, MonitorError> {
        let mut report = CycleReport::default();

        // Purge steps before the fetch, whatever its outcome.
        let local = self.evaluator.config().local_zone.local_time(now);
        let action = self.purge.step(local);
        report.purge = Some(action);

        if action == PurgeAction::Purge {
            report.purge_report = self.purge_channel().await;
        }

        let batch = match self.fetch().await? {
            Some(batch) => batch,
            None => {
                report.fetch_failed = true;
                return Ok(report);
            }
        };

        if let Some(log) = &self.snapshot_log {
            log.append(&batch);
        }

        let accepted = self.ingest(batch, &mut report);

        if action.suppresses_alerts() {
            debug!(?action, "inside daily purge window, alerts skipped");
            return Ok(report);
        }

        let signals = self.stats.signals(&self.store, &accepted);

        let cfg = self.evaluator.config();
        let quiet = in_quiet_hours(cfg, now);
        debug!(
            short_threshold = effective_threshold(cfg, Horizon::Short, quiet),
            long_threshold = effective_threshold(cfg, Horizon::Long, quiet),
            quiet,
            assets = signals.len(),
            "thresholds in force"
        );

        if let Some(batch) = self.evaluator.evaluate(&signals, now) {
            report.delivered = self.deliver(&batch).await;
            report.alert = Some(batch);
        }

        Ok(report)
    }

    /// `Ok(None)` on a transient failure still under the escalation limit.
    async fn fetch(&mut self) -> Result<Option<Vec<Sample>>, MonitorError> {
        match warn_if_slow("source.poll", FETCH_BUDGET, self.source.poll()).await {
            Ok(batch) => {
                if self.consecutive_failures > 0 {
                    info!(
                        after = self.consecutive_failures,
                        "data source recovered"
                    );
                }
                self.consecutive_failures = 0;
                debug!(samples = batch.len(), "batch fetched");
                Ok(Some(batch))
            }
            Err(FetchError::Fatal(reason)) => {
                error!(%reason, "fatal fetch error");
                Err(MonitorError::FatalFetch(reason))
            }
            Err(FetchError::Transient(reason)) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.max_consecutive_failures {
                    error!(
                        %reason,
                        failures = self.consecutive_failures,
                        "transient fetch failures escalated"
                    );
                    return Err(MonitorError::FatalFetch(format!(
                        "{} consecutive transient failures, last: {reason}",
                        self.consecutive_failures
                    )));
                }
                warn!(
                    %reason,
                    failures = self.consecutive_failures,
                    limit = self.max_consecutive_failures,
                    "transient fetch error, retrying next cycle"
                );
                Ok(None)
            }
        }
    }

    /// Feeds the batch into the store and returns the samples it accepted.
    fn ingest(&mut self, batch: Vec<Sample>, report: &mut CycleReport) -> Vec<Sample> {
        let mut accepted = Vec::with_capacity(batch.len());

        for sample in batch {
            let _span = asset_span(&sample.asset).entered();
            match self.store.ingest(sample.clone()) {
                Ok(()) => accepted.push(sample),
                Err(e) => {
                    report.dropped += 1;
                    warn!(error = %e, "sample dropped");
                }
            }
        }

        report.accepted = accepted.len();
        accepted
    }

    async fn purge_channel(&self) -> Option<PurgeReport> {
        let res = warn_if_slow(
            "notifier.purge",
            PURGE_BUDGET,
            self.notifier.purge_history(&self.channel),
        )
        .await;

        match res {
            Ok(r) => {
                info!(deleted = r.deleted, failed = r.failed, "daily purge done");
                Some(r)
            }
            Err(e) => {
                warn!(error = %e, "daily purge failed");
                None
            }
        }
    }

    /// Delivery failure is logged; the cooldown mark stays.
    async fn deliver(&self, batch: &AlertBatch) -> bool {
        let text = batch.message();
        let res = warn_if_slow(
            "notifier.send",
            SEND_BUDGET,
            self.notifier.send(&text, &self.channel),
        )
        .await;

        match res {
            Ok(()) => {
                info!(
                    horizon = %batch.horizon,
                    assets = ?batch.assets().collect::<Vec<_>>(),
                    "alert delivered"
                );
                true
            }
            Err(e) => {
                warn!(horizon = %batch.horizon, error = %e, "alert delivery failed");
                false
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}

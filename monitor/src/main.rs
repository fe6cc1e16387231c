use std::path::PathBuf;

use adapters::scanner::{RequestParameters, ScannerClient, ScannerSource};
use adapters::slack::SlackNotifier;
use alerting::{LogNotifier, Notifier};
use anyhow::Context;
use clap::Parser;
use common::logger::init_logger;
use monitor::{AppConfig, Monitor, SnapshotLog};
use tracing::info;

#[derive(Debug, Parser)]
#[clap(name = "monitor", version)]
struct Cli {
    /// Load environment variables from this file instead of `./.env`
    #[clap(long)]
    env_file: Option<PathBuf>,

    /// Log alerts and purges instead of posting them to Slack
    #[clap(long)]
    dry_run: bool,
}

fn load_env(path: Option<&std::path::Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            dotenvy::from_path(p).with_context(|| format!("failed to load {}", p.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

async fn run<N: Notifier>(
    cfg: &AppConfig,
    source: ScannerSource,
    notifier: N,
) -> anyhow::Result<()> {
    let mut monitor = Monitor::new(cfg, source, notifier);
    if let Some(path) = &cfg.csv_log_path {
        monitor = monitor.with_snapshot_log(SnapshotLog::new(path));
    }

    monitor.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    load_env(cli.env_file.as_deref())?;

    let cfg = AppConfig::from_env().context("failed to load configuration")?;
    init_logger("monitor", cfg.production);

    info!(
        symbols = cfg.symbols.len(),
        threshold = cfg.threshold,
        long_threshold = cfg.long_threshold,
        window = cfg.rolling_window_size(),
        dry_run = cli.dry_run,
        "starting market monitor"
    );

    let params = RequestParameters::from_file(&cfg.scanner_request_file).with_context(|| {
        format!(
            "failed to read scanner request from {}",
            cfg.scanner_request_file.display()
        )
    })?;
    let client = ScannerClient::new(cfg.scanner_url.clone(), params)
        .context("failed to build scanner client")?;
    let source = ScannerSource::new(client, cfg.symbols.clone());

    if cli.dry_run {
        run(&cfg, source, LogNotifier).await
    } else {
        let (bot, user) = cfg.slack_tokens()?;
        let notifier =
            SlackNotifier::from_tokens(bot, user).context("failed to build slack clients")?;
        run(&cfg, source, notifier).await
    }
}

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber. Later calls are no-ops.
///
/// `json` switches the output to one JSON object per line; otherwise the
/// compact human readable layout is used.
pub fn init_logger(service_name: &'static str, json: bool) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let base = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE);

        let res = if json {
            tracing_subscriber::registry()
                .with(filter)
                .with(base.json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(base.compact())
                .try_init()
        };

        if res.is_ok() {
            tracing::info!(service = service_name, json, "logger initialized");
        }
    });
}

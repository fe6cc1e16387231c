use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alerting::{CooldownCoupling, EvaluatorConfig, LocalZone, QuietHours};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{FixedOffset, NaiveTime};
use chrono_tz::Tz;

use crate::error::MonitorError;

pub const DEFAULT_SCANNER_URL: &str = "https://scanner.tradingview.com/crypto/scan";

#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // Watch-list and thresholds
    // =========================
    /// Assets to track. Rows for other assets are ignored; an empty list
    /// accepts everything the source returns.
    pub symbols: Vec<String>,

    /// Base threshold for the short horizon, in percentage points.
    pub threshold: f64,

    /// Base threshold for the long horizon. Falls back to `threshold`.
    pub long_threshold: f64,

    // =========================
    // Window and cadence
    // =========================
    /// Span of history the trailing mean is computed over.
    pub lookback_minutes: u64,

    /// Sleep between two poll cycles.
    pub poll_interval: Duration,

    // =========================
    // Cooldowns
    // =========================
    /// Repeat cycle the short cooldown is derived from (`round(secs / 3)`).
    pub alert_repeat_cycle_secs: u64,

    /// Long horizon cooldown. The default is one hour plus one poll of grace.
    pub long_cooldown_secs: u64,

    /// When set, firing either horizon resets the cooldown of both.
    pub couple_horizon_cooldowns: bool,

    // =========================
    // Local time policies
    // =========================
    /// Operator's clock. Quiet hours and the daily purge are local.
    /// `TIMEZONE` (IANA name) wins over `TIMEZONE_OFFSET`.
    pub local_zone: LocalZone,

    pub quiet_hours: QuietHours,

    /// Daily purge window `[purge_at, purge_reset_at)`. Always longer than
    /// `poll_interval`, so some cycle lands inside it.
    pub purge_at: NaiveTime,
    pub purge_reset_at: NaiveTime,

    // =========================
    // Collaborators
    // =========================
    /// Transient fetch failures in a row before the loop gives up.
    pub max_consecutive_fetch_failures: u32,

    pub scanner_url: String,
    pub scanner_request_file: PathBuf,

    pub slack_channel: String,
    pub bot_token: Option<String>,
    pub user_token: Option<String>,

    /// Every polled batch is appended here when set.
    pub csv_log_path: Option<PathBuf>,

    pub production: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let symbols = get("SYMBOLS")
            .context("SYMBOLS is required")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let threshold: f64 = required(&get, "THRESHOLD")?;
        let long_threshold: f64 = optional(&get, "LONG_THRESHOLD", threshold)?;
        for (key, v) in [("THRESHOLD", threshold), ("LONG_THRESHOLD", long_threshold)] {
            if !v.is_finite() || v < 0.0 {
                bail!("{key} must be a non-negative number, got {v}");
            }
        }

        let poll_interval_secs: u64 = optional(&get, "POLL_INTERVAL_SECS", 15)?;
        if poll_interval_secs == 0 {
            bail!("POLL_INTERVAL_SECS must be greater than zero");
        }

        let quiet_hours = QuietHours {
            start: time_or(&get, "QUIET_HOURS_START", "01:30")?,
            end: time_or(&get, "QUIET_HOURS_END", "06:00")?,
            bump: optional(&get, "QUIET_THRESHOLD_BUMP", 5.0)?,
        };

        let local_zone = match get("TIMEZONE") {
            Some(raw) => LocalZone::Named(
                raw.parse::<Tz>()
                    .map_err(|e| anyhow!("{e}"))
                    .with_context(|| format!("invalid TIMEZONE '{raw}'"))?,
            ),
            None => {
                let raw = get("TIMEZONE_OFFSET").unwrap_or_else(|| "+03:00".to_string());
                LocalZone::Fixed(
                    parse_offset(&raw)
                        .with_context(|| format!("invalid TIMEZONE_OFFSET '{raw}'"))?,
                )
            }
        };

        let purge_at = time_or(&get, "DAILY_PURGE_AT", "00:00")?;
        let purge_reset_at = time_or(&get, "DAILY_PURGE_RESET_AT", "00:01")?;
        let purge_window_secs = window_len_secs(purge_at, purge_reset_at);
        if purge_window_secs <= poll_interval_secs {
            bail!(
                "DAILY_PURGE_AT..DAILY_PURGE_RESET_AT spans {purge_window_secs}s, \
                 it must be longer than POLL_INTERVAL_SECS ({poll_interval_secs}s)"
            );
        }

        Ok(Self {
            symbols,
            threshold,
            long_threshold,
            lookback_minutes: required(&get, "LOOKBACK_MINUTES")?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            alert_repeat_cycle_secs: required(&get, "ALERT_REPEAT_CYCLE_FREQ")?,
            long_cooldown_secs: optional(&get, "LONG_COOLDOWN_SECS", 3615)?,
            couple_horizon_cooldowns: flag(&get, "COUPLE_HORIZON_COOLDOWNS")?,
            local_zone,
            quiet_hours,
            purge_at,
            purge_reset_at,
            max_consecutive_fetch_failures: optional(&get, "MAX_CONSECUTIVE_FETCH_FAILURES", 5)?,
            scanner_url: get("SCANNER_URL").unwrap_or_else(|| DEFAULT_SCANNER_URL.to_string()),
            scanner_request_file: get("SCANNER_REQUEST_FILE")
                .unwrap_or_else(|| "request_parameters.json".to_string())
                .into(),
            slack_channel: get("SLACK_CHANNEL")
                .map(|c| c.trim_start_matches('#').to_string())
                .unwrap_or_else(|| "coingecko".to_string()),
            bot_token: get("BOT_TOKEN"),
            user_token: get("USER_TOKEN"),
            csv_log_path: get("CSV_LOG_PATH").map(PathBuf::from),
            production: get("APP_ENV").is_some_and(|v| v == "production"),
        })
    }

    /// Samples per lookback span, at least one.
    pub fn rolling_window_size(&self) -> usize {
        let secs = self.lookback_minutes.saturating_mul(60);
        let n = secs / self.poll_interval.as_secs().max(1);
        usize::try_from(n).unwrap_or(usize::MAX).max(1)
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            short_threshold: self.threshold,
            long_threshold: self.long_threshold,
            short_cooldown: EvaluatorConfig::short_cooldown_from_repeat_cycle(
                self.alert_repeat_cycle_secs,
            ),
            long_cooldown: chrono::Duration::seconds(
                i64::try_from(self.long_cooldown_secs).unwrap_or(i64::MAX),
            ),
            coupling: if self.couple_horizon_cooldowns {
                CooldownCoupling::Coupled
            } else {
                CooldownCoupling::Independent
            },
            quiet_hours: Some(self.quiet_hours),
            local_zone: self.local_zone,
        }
    }

    /// Bot and user tokens, both required to talk to Slack.
    pub fn slack_tokens(&self) -> Result<(String, String), MonitorError> {
        match (&self.bot_token, &self.user_token) {
            (Some(bot), Some(user)) => Ok((bot.clone(), user.clone())),
            (None, _) => Err(MonitorError::Config("BOT_TOKEN is required".into())),
            (_, None) => Err(MonitorError::Config("USER_TOKEN is required".into())),
        }
    }
}

fn required<T, G>(get: &G, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key).with_context(|| format!("{key} is required"))?;
    raw.parse::<T>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("invalid {key} '{raw}'"))
}

fn optional<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("invalid {key} '{raw}'")),
        None => Ok(default),
    }
}

fn flag<G>(get: &G, key: &str) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("invalid {key} '{raw}', expected true or false"),
    }
}

fn time_or<G>(get: &G, key: &str, default: &str) -> Result<NaiveTime>
where
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    parse_hhmm(&raw).with_context(|| format!("invalid {key} '{raw}', expected HH:MM"))
}

/// Length of `[start, end)`, wrapping past midnight. Zero when `start == end`.
fn window_len_secs(start: NaiveTime, end: NaiveTime) -> u64 {
    let secs = end.signed_duration_since(start).num_seconds();
    let secs = if secs < 0 { secs + 24 * 3600 } else { secs };
    u64::try_from(secs).unwrap_or(0)
}

pub fn parse_hhmm(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(Into::into)
}

/// `+HH:MM` / `-HH:MM`; `Z` and `UTC` mean zero.
pub fn parse_offset(raw: &str) -> Result<FixedOffset> {
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).context("zero offset");
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => bail!("offset must start with + or -"),
    };
    let (h, m) = rest.split_once(':').unwrap_or((rest, "0"));
    let h: i32 = h.parse().context("offset hours")?;
    let m: i32 = m.parse().context("offset minutes")?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        bail!("offset out of range");
    }

    FixedOffset::east_opt(sign * (h * 3600 + m * 60)).context("offset out of range")
}

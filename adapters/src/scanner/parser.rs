//! Screener table → samples.
//!
//! Rows missing a name or a usable price are skipped with a warning; missing
//! or non-numeric change columns become `None`. Numbers may arrive as JSON
//! numbers or as display strings (`"−1.25%"`, `"3,120.5"`).

use chrono::{DateTime, Utc};
use market::Sample;
use serde_json::Value;
use tracing::warn;

use super::types::{ColumnLayout, ScanResponse, ScanRow};

pub fn parse_samples(
    resp: &ScanResponse,
    layout: ColumnLayout,
    watch_list: &[String],
    ts: DateTime<Utc>,
) -> Vec<Sample> {
    resp.data
        .iter()
        .filter_map(|row| parse_row(row, layout, ts))
        .filter(|s| is_watched(&s.asset, watch_list))
        .collect()
}

fn parse_row(row: &ScanRow, layout: ColumnLayout, ts: DateTime<Utc>) -> Option<Sample> {
    let Some(name) = row.d.get(layout.name).and_then(Value::as_str) else {
        warn!(symbol = ?row.s, "scanner row without a name, skipped");
        return None;
    };
    let name = name.trim();

    let Some(price) = row.d.get(layout.price).and_then(parse_number) else {
        warn!(asset = %name, "scanner row without a price, skipped");
        return None;
    };

    Some(Sample {
        asset: name.to_string(),
        price,
        ts,
        short_change: row.d.get(layout.short_change).and_then(parse_number),
        long_change: row.d.get(layout.long_change).and_then(parse_number),
    })
}

/// Empty watch-list accepts everything.
fn is_watched(asset: &str, watch_list: &[String]) -> bool {
    watch_list.is_empty() || watch_list.iter().any(|w| w.eq_ignore_ascii_case(asset))
}

pub fn parse_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(*c, '%' | ',' | ' '))
                .map(|c| if c == '\u{2212}' { '-' } else { c })
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

//! Rendering of alert batches into channel messages.
//!
//! ```text
//! :right_anger_bubble:*LAST 5 MINUTES*
//! BTCUSDT  %6.0 increased :arrow_up:
//! ETHUSDT  %12.3 decreased :arrow_down:
//!  -  -  -  - ...
//! ```

use crate::types::{AlertBatch, AlertCandidate, Direction};

const HEADER_ICON: &str = ":right_anger_bubble:";
const FOOTER_SEGMENT: &str = " - ";
const FOOTER_REPEAT: usize = 15;

pub fn render_batch(batch: &AlertBatch) -> String {
    let width = batch
        .candidates
        .iter()
        .map(|c| c.asset.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{HEADER_ICON}*{}*\n", batch.horizon.label());
    for c in &batch.candidates {
        out.push_str(&render_line(c, width));
        out.push('\n');
    }
    out.push_str(&FOOTER_SEGMENT.repeat(FOOTER_REPEAT));
    out
}

/// One line per asset; names are left-aligned to `width`.
pub fn render_line(c: &AlertCandidate, width: usize) -> String {
    let (verb, arrow) = match c.direction {
        Direction::Up => ("increased", ":arrow_up:"),
        Direction::Down => ("decreased", ":arrow_down:"),
    };
    format!(
        "{:<width$}  %{:.1} {verb} {arrow}",
        c.asset,
        c.magnitude(),
        width = width
    )
}

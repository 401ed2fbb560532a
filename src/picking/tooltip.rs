//! Tooltip text for hovered items.

use chrono::DateTime;

use crate::data::{epoch_first_height, epoch_last_height, BLOCKS_PER_EPOCH};
use crate::scene::{BlockInfo, DiscEra, DiscInfo, ItemKind, PlacedItem};

/// A tooltip: a bold title line followed by plain lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

impl std::fmt::Display for Tooltip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)?;
        for line in &self.lines {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

pub fn describe(item: &PlacedItem) -> Tooltip {
    match &item.kind {
        ItemKind::Block(info) => describe_block(info),
        ItemKind::Disc(info) => describe_disc(info),
    }
}

fn describe_disc(info: &DiscInfo) -> Tooltip {
    let period = match info.era {
        DiscEra::Future => "Future Period",
        DiscEra::Past => "Previous Period",
    };
    Tooltip {
        title: format!("Difficulty Adjustment {}", info.epoch),
        lines: vec![
            period.to_string(),
            format!("Double-click to navigate to epoch {}", info.epoch),
            format!(
                "Blocks: {} - {}",
                group_thousands(epoch_first_height(info.epoch)),
                group_thousands(epoch_last_height(info.epoch))
            ),
        ],
    }
}

fn describe_block(info: &BlockInfo) -> Tooltip {
    Tooltip {
        title: format!("Block {}", info.height),
        lines: vec![
            format!("Block {} of {}", info.index + 1, BLOCKS_PER_EPOCH),
            format!("Size: {} bytes", group_thousands(info.size)),
            format!("Date: {}", format_timestamp(info.time)),
            format!("Transactions: {}", info.n_tx),
            format!("Time Difference: {}", format_duration(info.time_difference)),
        ],
    }
}

/// `Mon D, YYYY, HH:MM:SS` in UTC. Out-of-range timestamps print as raw seconds.
pub fn format_timestamp(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%b %-d, %Y, %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}

/// `Mon D, YYYY` in UTC.
pub fn format_date(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => secs.to_string(),
    }
}

/// Compact duration: `1d 2h 3m 4s`, dropping leading zero units.
pub fn format_duration(secs: i64) -> String {
    if secs < 0 {
        return format!("-{}", format_duration(secs.saturating_neg()));
    }
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

//! Plain-text daily digest of stored trend rows.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::domain::{Channel, Topic, TrendRow};

const TOP_KEYWORDS: usize = 5;

/// Render stored rows as a per-day summary, newest day first.
///
/// Each day lists its top keywords by frequency with ranks, then the
/// remaining keywords in a compact list. An empty input renders a short
/// "nothing stored" notice instead.
#[must_use]
pub fn daily_digest(topic: &Topic, channel: &Channel, rows: &[TrendRow]) -> String {
    if rows.is_empty() {
        return format!("No stored data for topic '{topic}' on channel '{channel}'.");
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<&TrendRow>> = BTreeMap::new();
    for row in rows {
        by_day.entry(row.date).or_default().push(row);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Topic: {topic} (channel: {channel})");
    let _ = writeln!(out, "Days retained: {}", by_day.len());
    let _ = writeln!(out, "{}", "-".repeat(30));

    for (date, mut day_rows) in by_day.into_iter().rev() {
        day_rows.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.keyword.cmp(&b.keyword)));

        let _ = writeln!(out, "Date: {date}");
        let _ = writeln!(out, "Top keywords:");
        for (rank, row) in day_rows.iter().take(TOP_KEYWORDS).enumerate() {
            let _ = writeln!(
                out,
                "  {}. '{}' mentioned {} times",
                rank + 1,
                row.keyword,
                row.frequency
            );
        }

        let rest: Vec<String> = day_rows
            .iter()
            .skip(TOP_KEYWORDS)
            .map(|row| format!("{}({})", row.keyword, row.frequency))
            .collect();
        if !rest.is_empty() {
            let _ = writeln!(out, "Also mentioned: {}", rest.join(", "));
        }
        let _ = writeln!(out, "{}", "-".repeat(30));
    }

    out
}

//! Aggregated per-day keyword rows written to the permanent store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::{Channel, Topic};

/// One aggregated keyword observation for a topic, channel, and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRow {
    pub topic: Topic,
    pub channel: Channel,
    pub keyword: String,
    /// Mention count for the keyword on `date`.
    pub frequency: i64,
    /// Event day the aggregation refers to.
    pub date: NaiveDate,
}

impl TrendRow {
    /// Deterministic row id derived from the full identity of the row.
    ///
    /// Reruns for the same `(channel, topic, date, keyword)` produce the same
    /// id, so an upsert naturally overwrites instead of duplicating even if
    /// the same-day cleanup pass did not run.
    #[must_use]
    pub fn row_id(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.channel, self.topic, self.date, self.keyword
        )
    }
}

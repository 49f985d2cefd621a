//! Typed filter builder for permanent-store queries.
//!
//! Replaces ad-hoc filter dictionaries with an explicit conjunction of
//! equality predicates (topic, channel, keyword) and date bounds. Store
//! adapters compile a `RowFilter` into their native query language.

use chrono::NaiveDate;

use super::id::{Channel, Topic};
use super::row::TrendRow;

/// Conjunction of predicates over [`TrendRow`] fields.
///
/// Every set field must match; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub topic: Option<Topic>,
    pub channel: Option<Channel>,
    pub keyword: Option<String>,
    /// Match rows with `date` strictly before this day.
    pub date_before: Option<NaiveDate>,
    /// Match rows with exactly this `date`.
    pub date_on: Option<NaiveDate>,
}

impl RowFilter {
    /// An empty filter matching every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one topic.
    #[must_use]
    pub fn topic(mut self, topic: &Topic) -> Self {
        self.topic = Some(topic.clone());
        self
    }

    /// Restrict to one channel.
    #[must_use]
    pub fn channel(mut self, channel: &Channel) -> Self {
        self.channel = Some(channel.clone());
        self
    }

    /// Restrict to one keyword.
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Restrict to rows dated strictly before `date`.
    #[must_use]
    pub fn date_before(mut self, date: NaiveDate) -> Self {
        self.date_before = Some(date);
        self
    }

    /// Restrict to rows dated exactly `date`.
    #[must_use]
    pub fn date_on(mut self, date: NaiveDate) -> Self {
        self.date_on = Some(date);
        self
    }

    /// Reference semantics of the filter, used by in-memory test doubles.
    #[must_use]
    pub fn matches(&self, row: &TrendRow) -> bool {
        if let Some(topic) = &self.topic {
            if row.topic != *topic {
                return false;
            }
        }
        if let Some(channel) = &self.channel {
            if row.channel != *channel {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if row.keyword != *keyword {
                return false;
            }
        }
        if let Some(before) = self.date_before {
            if row.date >= before {
                return false;
            }
        }
        if let Some(on) = self.date_on {
            if row.date != on {
                return false;
            }
        }
        true
    }
}

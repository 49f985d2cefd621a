//! Raw collected items held in the per-topic master cache.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::RecordId;

/// One raw collected item.
///
/// The master cache is a set keyed by [`RecordId`]; insertion order is
/// irrelevant. `payload` carries whatever the feed returned (title,
/// description, engagement counters) as opaque JSON for downstream keyword
/// extraction - the cache layer never interprets it beyond text lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    /// Stable unique id, assigned upstream.
    pub id: RecordId,
    /// Event time (publication time) of the item.
    pub timestamp: DateTime<Utc>,
    /// Opaque fields needed downstream.
    pub payload: serde_json::Value,
}

impl MasterRecord {
    /// Create a record from its parts.
    #[must_use]
    pub fn new(id: RecordId, timestamp: DateTime<Utc>, payload: serde_json::Value) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }

    /// Calendar day of the event time (UTC).
    #[must_use]
    pub fn event_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// A named string field from the payload, if present and non-empty.
    #[must_use]
    pub fn payload_text(&self, field: &str) -> Option<&str> {
        self.payload
            .get(field)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

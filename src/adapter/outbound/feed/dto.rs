//! Wire types for the search feed API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{MasterRecord, RecordId};
use crate::error::FetchError;

/// One page of feed results.
#[derive(Debug, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Convert one feed item into a [`MasterRecord`].
///
/// Items must carry a non-empty string `id` and an RFC 3339 `published_at`;
/// the whole item object becomes the opaque payload. Callers drop and log
/// failures per item so one malformed entry never aborts the batch.
pub fn parse_item(item: &serde_json::Value) -> Result<MasterRecord, FetchError> {
    let id = item
        .get("id")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FetchError::Payload("item without id".into()))?;

    let published_at = item
        .get("published_at")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| FetchError::Payload(format!("item '{id}' without published_at")))?;
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(published_at)
        .map_err(|e| FetchError::Payload(format!("item '{id}' bad published_at: {e}")))?
        .with_timezone(&Utc);

    Ok(MasterRecord::new(
        RecordId::new(id),
        timestamp,
        item.clone(),
    ))
}

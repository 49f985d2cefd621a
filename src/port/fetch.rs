//! Port for the external collection collaborator.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{DateWindow, MasterRecord, Topic};
use crate::error::Result;

/// External fetch collaborator producing raw records for a topic.
///
/// Implementations must be safe to call repeatedly with the same cursor:
/// already-seen ids are deduplicated during the merge, so overlap is cheap
/// and expected. Malformed upstream items are dropped and logged inside the
/// implementation; they never abort a batch.
pub trait RecordFetcher: Send + Sync {
    /// Fetch records for `topic` within `window`.
    ///
    /// When `cursor` is set, the implementation may restrict the fetch to
    /// items published after the cursor instead of the whole window.
    fn fetch(
        &self,
        topic: &Topic,
        window: &DateWindow,
        cursor: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<MasterRecord>>> + Send;
}

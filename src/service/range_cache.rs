//! Coverage resolution against the permanent store.

use tracing::debug;

use crate::domain::{classify, Channel, Coverage, DateWindow, RowFilter, Topic};
use crate::error::Result;
use crate::port::TrendStore;

/// Decides whether stored data already satisfies a requested window.
///
/// Reads the span of event dates recorded for a `(topic, channel)` pair -
/// independent of any particular window - and classifies the request against
/// it. A store failure propagates to the caller as a transient error; it is
/// never treated as missing coverage, which would trigger a needless full
/// refetch on every glitch.
pub struct RangeCache<S> {
    store: S,
}

impl<S: TrendStore> RangeCache<S> {
    /// Create a range cache over the given store handle.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve the coverage verdict for a request.
    ///
    /// # Errors
    /// Propagates any store-access failure unchanged.
    pub async fn resolve(
        &self,
        topic: &Topic,
        channel: &Channel,
        window: &DateWindow,
    ) -> Result<Coverage> {
        let filter = RowFilter::new().topic(topic).channel(channel);
        let rows = self.store.get(&filter).await?;

        let span = rows
            .iter()
            .map(|row| row.date)
            .fold(None, |acc, date| match acc {
                None => Some((date, date)),
                Some((min, max)) => Some((min.min(date), max.max(date))),
            });

        let verdict = classify(window, span);
        debug!(
            %topic,
            %channel,
            requested = %window,
            stored = ?span,
            verdict = ?verdict,
            "coverage resolved"
        );
        Ok(verdict)
    }
}

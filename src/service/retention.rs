//! Reconciling a day's aggregated rows into the permanent store.

use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use crate::domain::{Channel, RowFilter, Topic, TrendRow};
use crate::error::Result;
use crate::port::TrendStore;

/// Makes the permanent store reflect exactly one day's aggregated rows,
/// subject to a rolling retention horizon.
pub struct RetentionSync<S> {
    store: S,
}

impl<S: TrendStore> RetentionSync<S> {
    /// Create a retention sync over the given store handle.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reconcile `rows` for `(topic, channel, date)`:
    ///
    /// 1. expire rows older than `date - retention_days` (best-effort);
    /// 2. remove any prior rows for the same day so reruns never duplicate
    ///    (best-effort);
    /// 3. drop rows below the `min_frequency` floor;
    /// 4. insert the survivors under deterministic ids.
    ///
    /// Steps 1-2 only log on failure. A failed insert is fatal for the call,
    /// since it leaves the current day unqueryable, and is returned to the
    /// caller unswallowed. Returns the number of rows persisted.
    ///
    /// # Errors
    /// Propagates the step-4 store write failure.
    pub async fn sync(
        &self,
        topic: &Topic,
        channel: &Channel,
        date: NaiveDate,
        rows: Vec<TrendRow>,
        retention_days: u32,
        min_frequency: i64,
    ) -> Result<usize> {
        let horizon = date
            .checked_sub_days(Days::new(u64::from(retention_days)))
            .unwrap_or(NaiveDate::MIN);
        let expiry = RowFilter::new()
            .topic(topic)
            .channel(channel)
            .date_before(horizon);
        match self.store.delete(&expiry).await {
            Ok(expired) if expired > 0 => {
                info!(%topic, %channel, %horizon, expired, "expired rows past retention horizon");
            }
            Ok(_) => {}
            Err(error) => {
                warn!(%topic, %channel, %error, "retention expiry failed, continuing");
            }
        }

        let same_day = RowFilter::new().topic(topic).channel(channel).date_on(date);
        if let Err(error) = self.store.delete(&same_day).await {
            warn!(%topic, %channel, %date, %error, "same-day cleanup failed, continuing");
        }

        let survivors: Vec<TrendRow> = rows
            .into_iter()
            .filter(|row| row.frequency >= min_frequency)
            .collect();
        if survivors.is_empty() {
            info!(%topic, %channel, %date, "no rows above the frequency floor, nothing to sync");
            return Ok(0);
        }

        self.store.upsert(&survivors).await?;
        info!(%topic, %channel, %date, rows = survivors.len(), "day synced into permanent store");
        Ok(survivors.len())
    }
}

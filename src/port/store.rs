//! Persistence ports for the permanent store and the master cache.

use std::future::Future;

use crate::domain::{Channel, MasterRecord, RowFilter, Topic, TrendRow};
use crate::error::Result;

/// Metadata-filtered access to the permanent, queryable store of aggregated
/// trend rows.
///
/// All operations are scoped through [`RowFilter`] conjunctions, so writes
/// for one `(topic, channel)` pair can never touch another pair's rows.
pub trait TrendStore: Send + Sync {
    /// Load every row matching the filter.
    fn get(&self, filter: &RowFilter) -> impl Future<Output = Result<Vec<TrendRow>>> + Send;

    /// Delete every row matching the filter. Returns the count deleted;
    /// matching nothing is not an error.
    fn delete(&self, filter: &RowFilter) -> impl Future<Output = Result<usize>> + Send;

    /// Insert rows, replacing any existing row with the same deterministic id.
    fn upsert(&self, rows: &[TrendRow]) -> impl Future<Output = Result<()>> + Send;
}

/// Durable storage for the per-topic master cache of raw collected records.
pub trait MasterStore: Send + Sync {
    /// Load the full persisted record set for a topic/channel.
    /// Returns an empty set if nothing was persisted yet.
    fn load(
        &self,
        topic: &Topic,
        channel: &Channel,
    ) -> impl Future<Output = Result<Vec<MasterRecord>>> + Send;

    /// Persist the full merged set as a single atomic overwrite.
    ///
    /// Either every record of the new set is stored or the previous set
    /// remains untouched; a partial write must never be observable.
    fn save(
        &self,
        topic: &Topic,
        channel: &Channel,
        records: &[MasterRecord],
    ) -> impl Future<Output = Result<()>> + Send;
}

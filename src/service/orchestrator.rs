//! Workflow state machine sequencing coverage check, collection, and sync.

use std::fmt;
use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;

use super::aggregate::keyword_frequencies;
use super::master_cache::{select_window, MasterCache, MasterCachePolicy};
use super::range_cache::RangeCache;
use super::report::daily_digest;
use super::retention::RetentionSync;
use crate::domain::{Channel, Coverage, RowFilter, Topic, TopicWindowRequest};
use crate::error::Result;
use crate::port::{MasterStore, RecordFetcher, TrendStore};

/// Stages of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BuildIntent,
    CacheCheck,
    Collect,
    RetentionSync,
    Analyze,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BuildIntent => "build_intent",
            Self::CacheCheck => "cache_check",
            Self::Collect => "collect",
            Self::RetentionSync => "retention_sync",
            Self::Analyze => "analyze",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Tunables for the sync stages of a run.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    /// Trailing days that must remain queryable in the permanent store.
    pub retention_days: u32,
    /// Keywords below this mention count are not persisted.
    pub min_frequency: i64,
    /// Upper bound on the external fetch call.
    pub fetch_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            retention_days: 30,
            min_frequency: 2,
            fetch_timeout: Duration::from_secs(120),
        }
    }
}

/// Summary of one completed run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub topic: Topic,
    pub channel: Channel,
    /// Verdict from the cache check stage.
    pub coverage: Coverage,
    /// Records returned by the external fetch (0 on cache hit or skip).
    pub fetched: usize,
    /// Rows written to the permanent store this run.
    pub rows_synced: usize,
    /// Human-readable summary of everything now stored for the pair.
    pub digest: String,
    /// Terminal stage; always [`Stage::Done`] for a returned report.
    pub stage: Stage,
}

/// Sequences `RangeCache -> (conditional fetch) -> MasterCache ->
/// RetentionSync -> analysis` for one request, skipping work the coverage
/// verdict proves unnecessary. Owns no data of its own; every collaborator
/// is injected.
pub struct Orchestrator<TS, MS, F> {
    trend_store: TS,
    range: RangeCache<TS>,
    master: MasterCache<MS>,
    retention: RetentionSync<TS>,
    fetcher: F,
    settings: OrchestratorSettings,
}

impl<TS, MS, F> Orchestrator<TS, MS, F>
where
    TS: TrendStore + Clone,
    MS: MasterStore,
    F: RecordFetcher,
{
    /// Wire the workflow from injected store handles and collaborators.
    #[must_use]
    pub fn new(
        trend_store: TS,
        master_store: MS,
        fetcher: F,
        policy: MasterCachePolicy,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            range: RangeCache::new(trend_store.clone()),
            retention: RetentionSync::new(trend_store.clone()),
            trend_store,
            master: MasterCache::new(master_store, policy),
            fetcher,
            settings,
        }
    }

    /// Execute one analysis run end to end.
    ///
    /// # Errors
    /// Returns the first fatal error: a transient store failure during the
    /// cache check (distinct from a valid empty result), a master-cache
    /// persistence failure, or a permanent-store write failure during sync.
    /// Fetch failures are not fatal; collection degrades to the persisted
    /// master cache.
    pub async fn run(&self, request: &TopicWindowRequest) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let TopicWindowRequest {
            topic,
            channel,
            window,
        } = request;
        info!(%run_id, stage = %Stage::BuildIntent, %topic, %channel, %window, "run started");

        let coverage = self
            .range
            .resolve(topic, channel, window)
            .await
            .map_err(|error| {
                error!(%run_id, stage = %Stage::Failed, during = %Stage::CacheCheck, %error, "run failed");
                error
            })?;

        let (fetched, rows_synced) = match coverage.fetch_window() {
            None => {
                info!(%run_id, stage = %Stage::CacheCheck, "full coverage, skipping collection");
                (0, 0)
            }
            Some(active) => {
                info!(%run_id, stage = %Stage::Collect, window = %active, "collecting");
                let outcome = self
                    .master
                    .refresh(
                        &self.fetcher,
                        topic,
                        channel,
                        active,
                        self.settings.fetch_timeout,
                    )
                    .await
                    .map_err(|error| {
                        error!(%run_id, stage = %Stage::Failed, during = %Stage::Collect, %error, "run failed");
                        error
                    })?;

                let reference = window.end();
                let slice = select_window(&outcome.records, reference, window.days() - 1);
                let rows = keyword_frequencies(&slice, topic, channel, reference);
                info!(
                    %run_id,
                    stage = %Stage::RetentionSync,
                    records = slice.len(),
                    keywords = rows.len(),
                    "aggregating and syncing"
                );
                let rows_synced = self
                    .retention
                    .sync(
                        topic,
                        channel,
                        reference,
                        rows,
                        self.settings.retention_days,
                        self.settings.min_frequency,
                    )
                    .await
                    .map_err(|error| {
                        error!(%run_id, stage = %Stage::Failed, during = %Stage::RetentionSync, %error, "run failed");
                        error
                    })?;
                (outcome.fetched, rows_synced)
            }
        };

        let stored = self
            .trend_store
            .get(&RowFilter::new().topic(topic).channel(channel))
            .await
            .map_err(|error| {
                error!(%run_id, stage = %Stage::Failed, during = %Stage::Analyze, %error, "run failed");
                error
            })?;
        let digest = daily_digest(topic, channel, &stored);

        info!(%run_id, stage = %Stage::Done, fetched, rows_synced, "run finished");
        Ok(RunReport {
            run_id,
            topic: topic.clone(),
            channel: channel.clone(),
            coverage,
            fetched,
            rows_synced,
            digest,
            stage: Stage::Done,
        })
    }
}

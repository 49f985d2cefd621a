//! The per-topic master cache: load, staleness decision, merge, save.
//!
//! The master cache is the full deduplicated superset of all historically
//! collected records for a topic, independent of any single request's
//! window. Mutation (merge + save) and read-time windowing are deliberately
//! separate: [`merge`] and [`select_window`] are pure functions, while
//! [`MasterCache::refresh`] owns the serialized load-fetch-merge-save cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{Channel, DateWindow, MasterRecord, Topic};
use crate::error::Result;
use crate::port::{MasterStore, RecordFetcher};

/// What the staleness heuristic decided to do about the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Stored data is fresh enough and large enough; no fetch.
    Skip,
    /// Extend the stored set with items published after the cursor.
    Incremental { cursor: DateTime<Utc> },
    /// The stored set is too small to trust; fetch the full span.
    Full,
}

/// Thresholds driving [`MasterCache::decide_fetch`].
#[derive(Debug, Clone, Copy)]
pub struct MasterCachePolicy {
    /// A set whose newest record is younger than this is considered fresh.
    pub freshness_secs: i64,
    /// Minimum viable set size; below it, a full-span fetch is requested.
    pub min_records: usize,
}

impl Default for MasterCachePolicy {
    fn default() -> Self {
        Self {
            freshness_secs: 3600,
            min_records: 30,
        }
    }
}

/// Union of `existing` and `incoming` keyed by record id.
///
/// On an id conflict the incoming record wins: upstream engagement metrics
/// only grow, so the freshly fetched copy is never staler. The result is
/// ordered newest-first with id as tiebreaker for determinism.
#[must_use]
pub fn merge(existing: Vec<MasterRecord>, incoming: Vec<MasterRecord>) -> Vec<MasterRecord> {
    let mut by_id: HashMap<_, MasterRecord> = existing
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect();
    for record in incoming {
        by_id.insert(record.id.clone(), record);
    }

    let mut merged: Vec<MasterRecord> = by_id.into_values().collect();
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
    merged
}

/// Read-time slice: records whose event date falls within the trailing
/// `span_days` window ending at `reference` (inclusive).
#[must_use]
pub fn select_window(
    records: &[MasterRecord],
    reference: NaiveDate,
    span_days: u32,
) -> Vec<MasterRecord> {
    let window = DateWindow::trailing(reference, span_days);
    records
        .iter()
        .filter(|record| window.contains(record.event_date()))
        .cloned()
        .collect()
}

/// Outcome of one [`MasterCache::refresh`] cycle.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// The full merged record set now persisted (or the prior set when the
    /// fetch was skipped or failed).
    pub records: Vec<MasterRecord>,
    /// Number of records the fetch returned before merging.
    pub fetched: usize,
}

/// Durable, deduplicated, monotonically-growing record set per topic.
///
/// `refresh` serializes the load-fetch-merge-save sequence per
/// `(topic, channel)` key, so two concurrent requests for the same topic
/// cannot race and silently drop each other's freshly fetched records.
/// Different keys proceed fully in parallel.
pub struct MasterCache<S> {
    store: S,
    policy: MasterCachePolicy,
    locks: DashMap<(Topic, Channel), Arc<Mutex<()>>>,
}

impl<S: MasterStore> MasterCache<S> {
    /// Create a master cache over the given store handle.
    #[must_use]
    pub fn new(store: S, policy: MasterCachePolicy) -> Self {
        Self {
            store,
            policy,
            locks: DashMap::new(),
        }
    }

    /// Load the persisted record set; empty if none was saved yet.
    pub async fn load(&self, topic: &Topic, channel: &Channel) -> Result<Vec<MasterRecord>> {
        self.store.load(topic, channel).await
    }

    /// Persist the full merged set as a single atomic overwrite.
    pub async fn save(
        &self,
        topic: &Topic,
        channel: &Channel,
        records: &[MasterRecord],
    ) -> Result<()> {
        self.store.save(topic, channel, records).await
    }

    /// Staleness heuristic over the existing set.
    #[must_use]
    pub fn decide_fetch(&self, existing: &[MasterRecord], now: DateTime<Utc>) -> FetchPlan {
        let Some(newest) = existing.iter().map(|record| record.timestamp).max() else {
            return FetchPlan::Full;
        };

        let age_secs = (now - newest).num_seconds();
        if age_secs <= self.policy.freshness_secs && existing.len() >= self.policy.min_records {
            return FetchPlan::Skip;
        }
        if existing.len() < self.policy.min_records {
            return FetchPlan::Full;
        }
        FetchPlan::Incremental { cursor: newest }
    }

    /// One full cache maintenance cycle for a key, serialized per key:
    /// load, decide, fetch (bounded by `fetch_timeout`), merge, save.
    ///
    /// A timed-out or failed fetch is treated as "no new data": the
    /// previously persisted set is returned unchanged and nothing is written,
    /// so a bad fetch can never leave the cache partially updated.
    ///
    /// # Errors
    /// Propagates store load/save failures. Fetch failures do not error.
    pub async fn refresh<F: RecordFetcher>(
        &self,
        fetcher: &F,
        topic: &Topic,
        channel: &Channel,
        window: &DateWindow,
        fetch_timeout: Duration,
    ) -> Result<RefreshOutcome> {
        let guard = self
            .locks
            .entry((topic.clone(), channel.clone()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _held = guard.lock().await;

        let existing = self.store.load(topic, channel).await?;
        let plan = self.decide_fetch(&existing, Utc::now());
        debug!(%topic, %channel, existing = existing.len(), plan = ?plan, "fetch decision");

        let cursor = match plan {
            FetchPlan::Skip => {
                info!(%topic, %channel, "master cache fresh, skipping fetch");
                return Ok(RefreshOutcome {
                    records: existing,
                    fetched: 0,
                });
            }
            FetchPlan::Incremental { cursor } => Some(cursor),
            FetchPlan::Full => None,
        };

        let fetched =
            match tokio::time::timeout(fetch_timeout, fetcher.fetch(topic, window, cursor)).await {
                Ok(Ok(records)) => records,
                Ok(Err(error)) => {
                    warn!(%topic, %channel, %error, "fetch failed, serving persisted cache");
                    return Ok(RefreshOutcome {
                        records: existing,
                        fetched: 0,
                    });
                }
                Err(_) => {
                    warn!(
                        %topic,
                        %channel,
                        timeout_secs = fetch_timeout.as_secs(),
                        "fetch timed out, serving persisted cache"
                    );
                    return Ok(RefreshOutcome {
                        records: existing,
                        fetched: 0,
                    });
                }
            };

        let fetched_count = fetched.len();
        let merged = merge(existing, fetched);
        self.store.save(topic, channel, &merged).await?;
        info!(
            %topic,
            %channel,
            fetched = fetched_count,
            total = merged.len(),
            "master cache refreshed"
        );

        Ok(RefreshOutcome {
            records: merged,
            fetched: fetched_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use crate::error::FetchError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    struct MemoryMasterStore {
        sets: StdMutex<HashMap<(Topic, Channel), Vec<MasterRecord>>>,
    }

    impl MemoryMasterStore {
        fn new() -> Self {
            Self {
                sets: StdMutex::new(HashMap::new()),
            }
        }
    }

    impl MasterStore for MemoryMasterStore {
        async fn load(&self, topic: &Topic, channel: &Channel) -> Result<Vec<MasterRecord>> {
            Ok(self
                .sets
                .lock()
                .unwrap()
                .get(&(topic.clone(), channel.clone()))
                .cloned()
                .unwrap_or_default())
        }

        async fn save(
            &self,
            topic: &Topic,
            channel: &Channel,
            records: &[MasterRecord],
        ) -> Result<()> {
            self.sets
                .lock()
                .unwrap()
                .insert((topic.clone(), channel.clone()), records.to_vec());
            Ok(())
        }
    }

    struct StubFetcher {
        records: Vec<MasterRecord>,
        calls: AtomicUsize,
        fail: bool,
    }

    /// Fetcher whose future never resolves, standing in for a hung feed.
    struct HangingFetcher;

    impl RecordFetcher for HangingFetcher {
        async fn fetch(
            &self,
            _topic: &Topic,
            _window: &DateWindow,
            _cursor: Option<DateTime<Utc>>,
        ) -> Result<Vec<MasterRecord>> {
            std::future::pending().await
        }
    }

    impl StubFetcher {
        fn returning(records: Vec<MasterRecord>) -> Self {
            Self {
                records,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                records: Vec::new(),
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl RecordFetcher for StubFetcher {
        async fn fetch(
            &self,
            _topic: &Topic,
            _window: &DateWindow,
            _cursor: Option<DateTime<Utc>>,
        ) -> Result<Vec<MasterRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Status { status: 503 }.into());
            }
            Ok(self.records.clone())
        }
    }

    fn record(id: &str, ts: &str) -> MasterRecord {
        MasterRecord::new(RecordId::new(id), ts.parse().unwrap(), json!({"title": id}))
    }

    fn record_with_payload(id: &str, ts: &str, payload: serde_json::Value) -> MasterRecord {
        MasterRecord::new(RecordId::new(id), ts.parse().unwrap(), payload)
    }

    #[test]
    fn merge_unions_by_id_with_incoming_winning() {
        // master cache {1,2,3@t1}, incoming {3@t2, 4} -> {1, 2, 3@t2, 4}
        let existing = vec![
            record("1", "2024-01-01T00:00:00Z"),
            record("2", "2024-01-02T00:00:00Z"),
            record_with_payload("3", "2024-01-03T00:00:00Z", json!({"views": 10})),
        ];
        let incoming = vec![
            record_with_payload("3", "2024-01-03T06:00:00Z", json!({"views": 99})),
            record("4", "2024-01-04T00:00:00Z"),
        ];

        let merged = merge(existing, incoming);
        assert_eq!(merged.len(), 4);

        let three = merged.iter().find(|r| r.id.as_str() == "3").unwrap();
        assert_eq!(three.payload, json!({"views": 99}));
        assert_eq!(three.timestamp, "2024-01-03T06:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn merge_is_idempotent_over_repeats() {
        let batch = vec![record("a", "2024-01-01T00:00:00Z")];
        let once = merge(Vec::new(), batch.clone());
        let twice = merge(once.clone(), batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn select_window_filters_by_event_date() {
        let records = vec![
            record("old", "2024-01-01T12:00:00Z"),
            record("edge", "2024-01-03T00:00:00Z"),
            record("new", "2024-01-10T12:00:00Z"),
        ];
        let slice = select_window(&records, "2024-01-10".parse().unwrap(), 7);
        let ids: Vec<_> = slice.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "edge"]);
    }

    fn cache_with(policy: MasterCachePolicy) -> MasterCache<MemoryMasterStore> {
        MasterCache::new(MemoryMasterStore::new(), policy)
    }

    #[test]
    fn decide_fetch_skips_fresh_and_large_sets() {
        let cache = cache_with(MasterCachePolicy {
            freshness_secs: 3600,
            min_records: 2,
        });
        let now: DateTime<Utc> = "2024-01-10T12:00:00Z".parse().unwrap();
        let existing = vec![
            record("a", "2024-01-10T11:30:00Z"),
            record("b", "2024-01-09T00:00:00Z"),
        ];
        assert_eq!(cache.decide_fetch(&existing, now), FetchPlan::Skip);
    }

    #[test]
    fn decide_fetch_requests_full_span_for_small_sets() {
        let cache = cache_with(MasterCachePolicy {
            freshness_secs: 3600,
            min_records: 5,
        });
        let now: DateTime<Utc> = "2024-01-10T12:00:00Z".parse().unwrap();

        assert_eq!(cache.decide_fetch(&[], now), FetchPlan::Full);

        // Fresh but below the minimum viable size: still a full fetch.
        let tiny = vec![record("a", "2024-01-10T11:59:00Z")];
        assert_eq!(cache.decide_fetch(&tiny, now), FetchPlan::Full);
    }

    #[test]
    fn decide_fetch_uses_newest_timestamp_as_cursor() {
        let cache = cache_with(MasterCachePolicy {
            freshness_secs: 3600,
            min_records: 2,
        });
        let now: DateTime<Utc> = "2024-01-10T12:00:00Z".parse().unwrap();
        let existing = vec![
            record("a", "2024-01-09T00:00:00Z"),
            record("b", "2024-01-08T00:00:00Z"),
        ];
        let cursor: DateTime<Utc> = "2024-01-09T00:00:00Z".parse().unwrap();
        assert_eq!(
            cache.decide_fetch(&existing, now),
            FetchPlan::Incremental { cursor }
        );
    }

    fn key() -> (Topic, Channel) {
        (Topic::new("food"), Channel::new("youtube"))
    }

    fn window() -> DateWindow {
        DateWindow::new("2024-01-01".parse().unwrap(), "2024-01-10".parse().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn refresh_persists_merged_set() {
        let cache = cache_with(MasterCachePolicy::default());
        let (topic, channel) = key();
        let fetcher = StubFetcher::returning(vec![
            record("a", "2024-01-05T00:00:00Z"),
            record("b", "2024-01-06T00:00:00Z"),
        ]);

        let outcome = cache
            .refresh(&fetcher, &topic, &channel, &window(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome.fetched, 2);
        assert_eq!(outcome.records.len(), 2);

        let persisted = cache.load(&topic, &channel).await.unwrap();
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn refresh_skips_fetch_when_fresh() {
        let cache = cache_with(MasterCachePolicy {
            freshness_secs: i64::MAX,
            min_records: 1,
        });
        let (topic, channel) = key();
        cache
            .save(&topic, &channel, &[record("a", "2024-01-05T00:00:00Z")])
            .await
            .unwrap();

        let fetcher = StubFetcher::returning(vec![record("b", "2024-01-06T00:00:00Z")]);
        let outcome = cache
            .refresh(&fetcher, &topic, &channel, &window(), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.fetched, 0);
        assert_eq!(outcome.records.len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_returns_persisted_set_unchanged() {
        let cache = cache_with(MasterCachePolicy::default());
        let (topic, channel) = key();
        let prior = vec![record("a", "2024-01-05T00:00:00Z")];
        cache.save(&topic, &channel, &prior).await.unwrap();

        let fetcher = StubFetcher::failing();
        let outcome = cache
            .refresh(&fetcher, &topic, &channel, &window(), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(outcome.fetched, 0);
        assert_eq!(outcome.records, prior);
        assert_eq!(cache.load(&topic, &channel).await.unwrap(), prior);
    }

    #[tokio::test]
    async fn timed_out_fetch_returns_persisted_set_unchanged() {
        let cache = cache_with(MasterCachePolicy::default());
        let (topic, channel) = key();
        let prior = vec![record("a", "2024-01-05T00:00:00Z")];
        cache.save(&topic, &channel, &prior).await.unwrap();

        let outcome = cache
            .refresh(
                &HangingFetcher,
                &topic,
                &channel,
                &window(),
                Duration::from_millis(50),
            )
            .await
            .unwrap();

        assert_eq!(outcome.fetched, 0);
        assert_eq!(outcome.records, prior);
        assert_eq!(cache.load(&topic, &channel).await.unwrap(), prior);
    }

    #[tokio::test]
    async fn concurrent_refreshes_for_same_key_do_not_drop_records() {
        let cache = Arc::new(cache_with(MasterCachePolicy {
            freshness_secs: 0,
            min_records: 0,
        }));
        let (topic, channel) = key();

        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            let (topic, channel) = (topic.clone(), channel.clone());
            handles.push(tokio::spawn(async move {
                let fetcher = StubFetcher::returning(vec![record(
                    &format!("r{i}"),
                    "2024-01-05T00:00:00Z",
                )]);
                cache
                    .refresh(&fetcher, &topic, &channel, &window(), Duration::from_secs(5))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Serialized load-merge-save means every task's record survives.
        let persisted = cache.load(&topic, &channel).await.unwrap();
        assert_eq!(persisted.len(), 8);
    }
}

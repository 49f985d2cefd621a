//! SQLite permanent store for aggregated trend rows.
//!
//! Compiles [`RowFilter`] conjunctions into Diesel predicates, so every
//! read, delete, and upsert stays scoped to the filter's topic/channel keys.

use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;
use tracing::warn;

use super::database::connection::{configure_connection, DbPool};
use super::database::model::TrendRowRecord;
use super::database::schema::trend_rows;
use crate::domain::{Channel, RowFilter, Topic, TrendRow};
use crate::error::{Result, StoreError};
use crate::port::TrendStore;

type BoxedPredicate = Box<dyn BoxableExpression<trend_rows::table, Sqlite, SqlType = Bool>>;

/// SQLite-backed implementation of [`TrendStore`].
#[derive(Clone)]
pub struct SqliteTrendStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteTrendStore {
    /// Create a new trend store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn predicate(filter: &RowFilter) -> BoxedPredicate {
        let mut pred: BoxedPredicate = Box::new(diesel::dsl::sql::<Bool>("1=1"));
        if let Some(topic) = &filter.topic {
            pred = Box::new(pred.and(trend_rows::topic.eq(topic.as_str().to_owned())));
        }
        if let Some(channel) = &filter.channel {
            pred = Box::new(pred.and(trend_rows::channel.eq(channel.as_str().to_owned())));
        }
        if let Some(keyword) = &filter.keyword {
            pred = Box::new(pred.and(trend_rows::keyword.eq(keyword.clone())));
        }
        if let Some(before) = filter.date_before {
            // ISO dates order lexicographically, so TEXT comparison is safe.
            pred = Box::new(pred.and(trend_rows::date.lt(before.to_string())));
        }
        if let Some(on) = filter.date_on {
            pred = Box::new(pred.and(trend_rows::date.eq(on.to_string())));
        }
        pred
    }

    fn to_record(row: &TrendRow) -> TrendRowRecord {
        TrendRowRecord {
            id: row.row_id(),
            topic: row.topic.to_string(),
            channel: row.channel.to_string(),
            keyword: row.keyword.clone(),
            frequency: row.frequency,
            date: row.date.to_string(),
        }
    }

    fn from_record(record: TrendRowRecord) -> Result<TrendRow> {
        let date = record
            .date
            .parse()
            .map_err(|_| StoreError::Decode(format!("bad date '{}'", record.date)))?;
        Ok(TrendRow {
            topic: Topic::new(record.topic),
            channel: Channel::new(record.channel),
            keyword: record.keyword,
            frequency: record.frequency,
            date,
        })
    }
}

impl TrendStore for SqliteTrendStore {
    async fn get(&self, filter: &RowFilter) -> Result<Vec<TrendRow>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let rows: Vec<TrendRowRecord> = trend_rows::table
            .filter(Self::predicate(filter))
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_record).collect()
    }

    async fn delete(&self, filter: &RowFilter) -> Result<usize> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if let Err(e) = configure_connection(&mut conn) {
            warn!(error = %e, "failed to configure connection pragmas");
        }

        let deleted = diesel::delete(trend_rows::table.filter(Self::predicate(filter)))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(deleted)
    }

    async fn upsert(&self, rows: &[TrendRow]) -> Result<()> {
        let records: Vec<TrendRowRecord> = rows.iter().map(Self::to_record).collect();
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if let Err(e) = configure_connection(&mut conn) {
            warn!(error = %e, "failed to configure connection pragmas");
        }

        diesel::replace_into(trend_rows::table)
            .values(&records)
            .execute(&mut conn)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};

    fn setup_store() -> SqliteTrendStore {
        let pool = create_pool(":memory:").expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        SqliteTrendStore::new(pool)
    }

    fn row(topic: &str, channel: &str, keyword: &str, frequency: i64, date: &str) -> TrendRow {
        TrendRow {
            topic: Topic::new(topic),
            channel: Channel::new(channel),
            keyword: keyword.into(),
            frequency,
            date: date.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_roundtrip() {
        let store = setup_store();
        let rows = vec![
            row("food", "youtube", "tanghulu", 5, "2024-06-01"),
            row("food", "youtube", "bagel", 3, "2024-06-01"),
        ];
        store.upsert(&rows).await.unwrap();

        let loaded = store
            .get(&RowFilter::new().topic(&Topic::new("food")))
            .await
            .unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&rows[0]));
        assert!(loaded.contains(&rows[1]));
    }

    #[tokio::test]
    async fn upsert_replaces_by_deterministic_id() {
        let store = setup_store();
        store
            .upsert(&[row("food", "youtube", "tanghulu", 5, "2024-06-01")])
            .await
            .unwrap();
        store
            .upsert(&[row("food", "youtube", "tanghulu", 9, "2024-06-01")])
            .await
            .unwrap();

        let loaded = store.get(&RowFilter::new()).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].frequency, 9);
    }

    #[tokio::test]
    async fn filters_compile_to_scoped_queries() {
        let store = setup_store();
        store
            .upsert(&[
                row("food", "youtube", "tanghulu", 5, "2024-06-01"),
                row("food", "naver_blog", "tanghulu", 2, "2024-06-01"),
                row("fashion", "youtube", "loafers", 4, "2024-06-02"),
            ])
            .await
            .unwrap();

        let filter = RowFilter::new()
            .topic(&Topic::new("food"))
            .channel(&Channel::new("youtube"));
        let loaded = store.get(&filter).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].channel.as_str(), "youtube");
    }

    #[tokio::test]
    async fn keyword_filter_matches_exactly() {
        let store = setup_store();
        store
            .upsert(&[
                row("food", "youtube", "tanghulu", 5, "2024-06-01"),
                row("food", "youtube", "tanghulu candy", 2, "2024-06-01"),
            ])
            .await
            .unwrap();

        let loaded = store
            .get(&RowFilter::new().keyword("tanghulu"))
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].frequency, 5);
    }

    #[tokio::test]
    async fn date_before_deletes_only_older_rows() {
        let store = setup_store();
        store
            .upsert(&[
                row("food", "youtube", "old", 5, "2024-05-01"),
                row("food", "youtube", "edge", 5, "2024-05-10"),
                row("food", "youtube", "new", 5, "2024-05-20"),
            ])
            .await
            .unwrap();

        let deleted = store
            .delete(
                &RowFilter::new()
                    .topic(&Topic::new("food"))
                    .date_before("2024-05-10".parse().unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let remaining = store.get(&RowFilter::new()).await.unwrap();
        let keywords: Vec<_> = remaining.iter().map(|r| r.keyword.as_str()).collect();
        assert!(keywords.contains(&"edge"));
        assert!(keywords.contains(&"new"));
    }

    #[tokio::test]
    async fn delete_with_no_matches_returns_zero() {
        let store = setup_store();
        let deleted = store
            .delete(&RowFilter::new().topic(&Topic::new("nothing")))
            .await
            .unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn date_on_matches_exactly_one_day() {
        let store = setup_store();
        store
            .upsert(&[
                row("food", "youtube", "a", 5, "2024-06-01"),
                row("food", "youtube", "b", 5, "2024-06-02"),
            ])
            .await
            .unwrap();

        let loaded = store
            .get(&RowFilter::new().date_on("2024-06-02".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].keyword, "b");
    }
}

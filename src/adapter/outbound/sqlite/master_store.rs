//! SQLite persistence for the per-topic master cache.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;

use super::database::connection::{configure_connection, DbPool};
use super::database::model::MasterRecordRow;
use super::database::schema::master_records;
use crate::domain::{Channel, MasterRecord, RecordId, Topic};
use crate::error::{Result, StoreError};
use crate::port::MasterStore;

/// SQLite-backed implementation of [`MasterStore`].
///
/// `save` runs delete-then-insert inside one transaction, so a failed write
/// rolls back to the previously persisted set instead of leaving a partial
/// overwrite behind.
#[derive(Clone)]
pub struct SqliteMasterStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteMasterStore {
    /// Create a new master store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(topic: &Topic, channel: &Channel, record: &MasterRecord) -> Result<MasterRecordRow> {
        Ok(MasterRecordRow {
            id: record.id.to_string(),
            topic: topic.to_string(),
            channel: channel.to_string(),
            timestamp: record.timestamp.to_rfc3339(),
            payload: serde_json::to_string(&record.payload)?,
        })
    }

    fn from_row(row: MasterRecordRow) -> Result<MasterRecord> {
        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| StoreError::Decode(e.to_string()))?
            .with_timezone(&Utc);
        let payload =
            serde_json::from_str(&row.payload).map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(MasterRecord {
            id: RecordId::from(row.id),
            timestamp,
            payload,
        })
    }
}

impl MasterStore for SqliteMasterStore {
    async fn load(&self, topic: &Topic, channel: &Channel) -> Result<Vec<MasterRecord>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let rows: Vec<MasterRecordRow> = master_records::table
            .filter(master_records::topic.eq(topic.as_str()))
            .filter(master_records::channel.eq(channel.as_str()))
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn save(
        &self,
        topic: &Topic,
        channel: &Channel,
        records: &[MasterRecord],
    ) -> Result<()> {
        let rows: Vec<MasterRecordRow> = records
            .iter()
            .map(|record| Self::to_row(topic, channel, record))
            .collect::<Result<_>>()?;

        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if let Err(e) = configure_connection(&mut conn) {
            warn!(error = %e, "failed to configure connection pragmas");
        }

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(
                master_records::table
                    .filter(master_records::topic.eq(topic.as_str()))
                    .filter(master_records::channel.eq(channel.as_str())),
            )
            .execute(conn)?;

            diesel::insert_into(master_records::table)
                .values(&rows)
                .execute(conn)?;

            Ok(())
        })
        .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }
}

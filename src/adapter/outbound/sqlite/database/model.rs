//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{master_records, trend_rows};

/// Database row for an aggregated trend row.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = trend_rows)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TrendRowRecord {
    pub id: String,
    pub topic: String,
    pub channel: String,
    pub keyword: String,
    pub frequency: i64,
    pub date: String,
}

/// Database row for a master cache record.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = master_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MasterRecordRow {
    pub id: String,
    pub topic: String,
    pub channel: String,
    pub timestamp: String,
    pub payload: String,
}

//! Shared fixtures for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tempfile::TempDir;
use trendsync::adapter::outbound::sqlite::database::connection::{
    create_pool, run_migrations, DbPool,
};
use trendsync::domain::{DateWindow, MasterRecord, RecordId, Topic};
use trendsync::error::{FetchError, Result};
use trendsync::port::RecordFetcher;

/// A file-backed SQLite database that lives for the duration of a test.
///
/// r2d2 hands each checkout its own connection, so `:memory:` databases
/// would not be shared across the pool; a temp file is.
pub struct TempDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("trendsync-test.db");
        let pool = create_pool(path.to_str().expect("utf8 path")).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Fetcher double returning a fixed batch, or an error when `fail` is set.
pub struct ScriptedFetcher {
    pub records: Vec<MasterRecord>,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn returning(records: Vec<MasterRecord>) -> Self {
        Self {
            records,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl RecordFetcher for ScriptedFetcher {
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

pub fn record(id: &str, ts: &str, title: &str) -> MasterRecord {
    MasterRecord::new(
        RecordId::new(id),
        ts.parse().expect("valid timestamp"),
        json!({"title": title, "description": ""}),
    )
}

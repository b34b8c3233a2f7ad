//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the StateStore trait.
//! Each save replaces every row inside one transaction, so a concurrent
//! reader sees either the previous snapshot or the new one.

use crate::state::{CrawlState, Query};
use crate::storage::schema::initialize_schema;
use crate::storage::summary::write_summary;
use crate::storage::traits::{StateStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};

const API_CALLS_KEY: &str = "api_calls";
const SAVED_AT_KEY: &str = "saved_at";

/// SQLite state store
pub struct SqliteStateStore {
    conn: Connection,
    db_path: PathBuf,
    summary_path: PathBuf,
}

impl SqliteStateStore {
    /// Opens or creates the database at `db_path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStateStore)` - Successfully opened/created database
    /// * `Err(StorageError::DataCorruption)` - The file exists but is not a database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(db_path: impl Into<PathBuf>, summary_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let db_path = db_path.into();
        let conn = Connection::open(&db_path)?;

        let init = conn
            .execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA temp_store = MEMORY;
            ",
            )
            .and_then(|_| initialize_schema(&conn));

        if let Err(e) = init {
            if e.sqlite_error_code() == Some(ErrorCode::NotADatabase) {
                return Err(StorageError::corruption(&db_path, e));
            }
            return Err(e.into());
        }

        Ok(Self {
            conn,
            db_path,
            summary_path: summary_path.into(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(summary_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
            summary_path: summary_path.into(),
        })
    }

    fn read_meta(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM crawl_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn read_column(&self, sql: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let values = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> StorageResult<Option<CrawlState>> {
        let Some(raw_calls) = self.read_meta(API_CALLS_KEY)? else {
            return Ok(None);
        };

        let api_calls: u64 = raw_calls.parse().map_err(|e| {
            StorageError::corruption(
                &self.db_path,
                format!("api_calls '{}' is not a count: {}", raw_calls, e),
            )
        })?;

        let visited = self.read_column("SELECT query FROM visited_queries")?;
        let discovered = self.read_column("SELECT value FROM discovered_strings")?;

        Ok(Some(CrawlState::from_parts(
            visited.into_iter().map(Query::new),
            discovered,
            api_calls,
        )))
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM visited_queries", [])?;
        tx.execute("DELETE FROM discovered_strings", [])?;
        {
            let mut insert_query = tx.prepare("INSERT INTO visited_queries (query) VALUES (?1)")?;
            for query in state.visited() {
                insert_query.execute(params![query.as_str()])?;
            }

            let mut insert_string =
                tx.prepare("INSERT INTO discovered_strings (value) VALUES (?1)")?;
            for value in state.discovered() {
                insert_string.execute(params![value])?;
            }

            let mut upsert_meta = tx.prepare(
                "INSERT INTO crawl_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            upsert_meta.execute(params![API_CALLS_KEY, state.api_calls().to_string()])?;
            upsert_meta.execute(params![SAVED_AT_KEY, Utc::now().to_rfc3339()])?;
        }
        tx.commit()?;

        write_summary(&self.summary_path, state)?;

        tracing::debug!(
            "Saved {} visited queries and {} strings to {}",
            state.visited().len(),
            state.discovered().len(),
            self.db_path.display()
        );
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.db_path
    }
}

//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite state backend.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Queries already submitted to the endpoint
CREATE TABLE IF NOT EXISTS visited_queries (
    query TEXT PRIMARY KEY NOT NULL
);

-- Distinct suggestions returned by any query
CREATE TABLE IF NOT EXISTS discovered_strings (
    value TEXT PRIMARY KEY NOT NULL
);

-- Scalar crawl metadata (api_calls, saved_at)
CREATE TABLE IF NOT EXISTS crawl_meta (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    // Run each migration
    run_migration(conn, "001_activity_samples", CREATE_ACTIVITY_SAMPLES_TABLE)?;
    run_migration(conn, "002_activity_summary", CREATE_ACTIVITY_SUMMARY_TABLE)?;
    run_migration(conn, "003_watchlist", CREATE_WATCHLIST_TABLE)?;
    run_migration(conn, "004_settings", CREATE_SETTINGS_TABLE)?;

    tracing::debug!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_ACTIVITY_SAMPLES_TABLE: &str = r#"
CREATE TABLE activity_samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL,
    timestamp_millis INTEGER NOT NULL,
    call_volume INTEGER NOT NULL DEFAULT 0,
    put_volume INTEGER NOT NULL DEFAULT 0,
    call_open_interest INTEGER NOT NULL DEFAULT 0,
    put_open_interest INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(symbol, timestamp_millis)
);
CREATE INDEX IF NOT EXISTS idx_activity_symbol_ts ON activity_samples(symbol, timestamp_millis);
"#;

const CREATE_ACTIVITY_SUMMARY_TABLE: &str = r#"
CREATE TABLE activity_summary (
    symbol TEXT PRIMARY KEY,
    avg_call_put_ratio REAL,
    sample_count INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_WATCHLIST_TABLE: &str = r#"
CREATE TABLE watchlist (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL UNIQUE,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_SETTINGS_TABLE: &str = r#"
CREATE TABLE settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

//! Watchlist persistence
//!
//! An ordered set of tracked tickers. Insertion order is preserved via
//! the position column; add and remove are both idempotent.

use crate::error::Result;
use rusqlite::{params, Connection};

/// Add a symbol. Returns false (no-op) if it is already present.
pub fn add(conn: &Connection, symbol: &str) -> Result<bool> {
    let next_position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM watchlist",
        [],
        |row| row.get(0),
    )?;

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO watchlist (symbol, position) VALUES (?1, ?2)",
        params![symbol, next_position],
    )?;

    Ok(inserted > 0)
}

/// Remove a symbol. Returns false (no-op) if it was not present.
pub fn remove(conn: &Connection, symbol: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM watchlist WHERE symbol = ?1", params![symbol])?;
    Ok(removed > 0)
}

/// List symbols in insertion order
pub fn list(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT symbol FROM watchlist ORDER BY position ASC")?;

    let symbols = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(symbols)
}

/// Whether a symbol is currently watched
pub fn contains(conn: &Connection, symbol: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM watchlist WHERE symbol = ?1)",
        params![symbol],
        |row| row.get(0),
    )?;
    Ok(exists)
}

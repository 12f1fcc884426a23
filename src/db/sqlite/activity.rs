//! Options-activity time-series storage
//!
//! Samples are keyed by (symbol, timestamp_millis); writes replace on
//! conflict, so re-running a polling cycle is harmless. Batch writes go
//! through a single transaction so a cycle's rows land all-or-nothing.

use crate::db::sqlite::models::ActivitySummary;
use crate::error::Result;
use crate::providers::types::ActivitySample;
use rusqlite::{params, Connection};

const UPSERT_SQL: &str = "INSERT INTO activity_samples
     (symbol, timestamp_millis, call_volume, put_volume, call_open_interest, put_open_interest)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT(symbol, timestamp_millis) DO UPDATE SET
         call_volume = excluded.call_volume,
         put_volume = excluded.put_volume,
         call_open_interest = excluded.call_open_interest,
         put_open_interest = excluded.put_open_interest";

/// Upsert a single sample
pub fn upsert(conn: &Connection, sample: &ActivitySample) -> Result<()> {
    conn.execute(
        UPSERT_SQL,
        params![
            sample.symbol,
            sample.timestamp_millis,
            sample.call_volume,
            sample.put_volume,
            sample.call_open_interest,
            sample.put_open_interest,
        ],
    )?;
    Ok(())
}

/// Upsert a batch of samples inside one transaction
pub fn upsert_batch(conn: &mut Connection, samples: &[ActivitySample]) -> Result<()> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(UPSERT_SQL)?;
        for sample in samples {
            stmt.execute(params![
                sample.symbol,
                sample.timestamp_millis,
                sample.call_volume,
                sample.put_volume,
                sample.call_open_interest,
                sample.put_open_interest,
            ])?;
        }
    }

    tx.commit()?;
    tracing::debug!("Stored {} activity samples", samples.len());
    Ok(())
}

fn row_to_sample(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivitySample> {
    Ok(ActivitySample {
        symbol: row.get(0)?,
        timestamp_millis: row.get(1)?,
        call_volume: row.get(2)?,
        put_volume: row.get(3)?,
        call_open_interest: row.get(4)?,
        put_open_interest: row.get(5)?,
    })
}

/// Range scan over one symbol, ascending by timestamp
pub fn query(
    conn: &Connection,
    symbol: &str,
    start_millis: i64,
    end_millis: i64,
) -> Result<Vec<ActivitySample>> {
    let mut stmt = conn.prepare(
        "SELECT symbol, timestamp_millis, call_volume, put_volume,
                call_open_interest, put_open_interest
         FROM activity_samples
         WHERE symbol = ?1 AND timestamp_millis >= ?2 AND timestamp_millis <= ?3
         ORDER BY timestamp_millis ASC",
    )?;

    let samples = stmt
        .query_map(params![symbol, start_millis, end_millis], row_to_sample)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(samples)
}

/// The two most recent samples for a symbol, oldest first. Returns fewer
/// than two entries when the history is that short.
pub fn latest_two(conn: &Connection, symbol: &str) -> Result<Vec<ActivitySample>> {
    let mut stmt = conn.prepare(
        "SELECT symbol, timestamp_millis, call_volume, put_volume,
                call_open_interest, put_open_interest
         FROM activity_samples
         WHERE symbol = ?1
         ORDER BY timestamp_millis DESC
         LIMIT 2",
    )?;

    let mut samples = stmt
        .query_map(params![symbol], row_to_sample)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    samples.reverse();
    Ok(samples)
}

/// Delete samples older than the cutoff. Returns the number removed.
pub fn prune(conn: &Connection, cutoff_millis: i64) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM activity_samples WHERE timestamp_millis < ?1",
        params![cutoff_millis],
    )?;

    if removed > 0 {
        tracing::info!("Pruned {} activity samples", removed);
    }
    Ok(removed)
}

/// Recompute the per-symbol rolling summary from stored samples.
pub fn refresh_summary(conn: &Connection, symbol: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO activity_summary (symbol, avg_call_put_ratio, sample_count, updated_at)
         SELECT ?1,
                AVG(CASE WHEN put_volume > 0
                    THEN CAST(call_volume AS REAL) / put_volume END),
                COUNT(*),
                datetime('now')
         FROM activity_samples WHERE symbol = ?1
         ON CONFLICT(symbol) DO UPDATE SET
             avg_call_put_ratio = excluded.avg_call_put_ratio,
             sample_count = excluded.sample_count,
             updated_at = excluded.updated_at",
        params![symbol],
    )?;
    Ok(())
}

/// Fetch the rolling summary for a symbol, if one has been computed.
pub fn get_summary(conn: &Connection, symbol: &str) -> Result<Option<ActivitySummary>> {
    let mut stmt = conn.prepare(
        "SELECT symbol, avg_call_put_ratio, sample_count
         FROM activity_summary WHERE symbol = ?1",
    )?;

    let mut rows = stmt.query_map(params![symbol], |row| {
        Ok(ActivitySummary {
            symbol: row.get(0)?,
            avg_call_put_ratio: row.get(1)?,
            sample_count: row.get(2)?,
        })
    })?;

    match rows.next() {
        Some(summary) => Ok(Some(summary?)),
        None => Ok(None),
    }
}

//! SQLite database module

pub mod models;
mod activity;
mod migrations;
mod settings;
mod watchlist;

use crate::error::Result;
use crate::providers::types::ActivitySample;
use models::{ActivitySummary, SettingKey, Settings};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Open (or create) the database at the given path. Migrations run
    /// here and are idempotent, so every handle starts on an
    /// initialized schema.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// In-memory database, used by tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Activity Sample Methods ==========

    /// Upsert a single activity sample
    pub fn upsert_sample(&self, sample: &ActivitySample) -> Result<()> {
        let conn = self.conn.lock();
        activity::upsert(&conn, sample)
    }

    /// Upsert a batch of samples atomically, then refresh the rolling
    /// summaries for the symbols touched
    pub fn upsert_samples(&self, samples: &[ActivitySample]) -> Result<()> {
        let mut conn = self.conn.lock();
        activity::upsert_batch(&mut conn, samples)?;

        let mut symbols: Vec<&str> = samples.iter().map(|s| s.symbol.as_str()).collect();
        symbols.sort_unstable();
        symbols.dedup();
        for symbol in symbols {
            activity::refresh_summary(&conn, symbol)?;
        }

        Ok(())
    }

    /// Query samples for a symbol within [start, end], ascending by timestamp
    pub fn query_samples(
        &self,
        symbol: &str,
        start_millis: i64,
        end_millis: i64,
    ) -> Result<Vec<ActivitySample>> {
        let conn = self.conn.lock();
        activity::query(&conn, symbol, start_millis, end_millis)
    }

    /// The two most recent samples for a symbol, oldest first
    pub fn latest_two_samples(&self, symbol: &str) -> Result<Vec<ActivitySample>> {
        let conn = self.conn.lock();
        activity::latest_two(&conn, symbol)
    }

    /// Delete samples older than `max_age`. Returns the number removed.
    pub fn prune_samples(&self, max_age: Duration) -> Result<usize> {
        let cutoff = chrono::Utc::now().timestamp_millis() - max_age.as_millis() as i64;
        let conn = self.conn.lock();
        activity::prune(&conn, cutoff)
    }

    /// Rolling per-symbol summary, if computed
    pub fn activity_summary(&self, symbol: &str) -> Result<Option<ActivitySummary>> {
        let conn = self.conn.lock();
        activity::get_summary(&conn, symbol)
    }

    // ========== Watchlist Methods ==========

    /// Add a symbol to the watchlist. Returns false if already present.
    pub fn watchlist_add(&self, symbol: &str) -> Result<bool> {
        let conn = self.conn.lock();
        watchlist::add(&conn, symbol)
    }

    /// Remove a symbol from the watchlist. Returns false if absent.
    pub fn watchlist_remove(&self, symbol: &str) -> Result<bool> {
        let conn = self.conn.lock();
        watchlist::remove(&conn, symbol)
    }

    /// List watched symbols in insertion order
    pub fn watchlist(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        watchlist::list(&conn)
    }

    /// Whether a symbol is watched
    pub fn watchlist_contains(&self, symbol: &str) -> Result<bool> {
        let conn = self.conn.lock();
        watchlist::contains(&conn, symbol)
    }

    // ========== Settings Methods ==========

    /// Load the full settings snapshot
    pub fn load_settings(&self) -> Result<Settings> {
        let conn = self.conn.lock();
        settings::load(&conn)
    }

    /// Persist one setting value (stringified)
    pub fn set_setting(&self, key: SettingKey, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        settings::set_raw(&conn, key, value)
    }

    /// Raw stored value for one setting, if present
    pub fn get_setting(&self, key: SettingKey) -> Result<Option<String>> {
        let conn = self.conn.lock();
        settings::get_raw(&conn, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::models::ProviderKind;

    fn sample(symbol: &str, ts: i64, call_volume: i64, put_volume: i64) -> ActivitySample {
        ActivitySample {
            symbol: symbol.to_string(),
            timestamp_millis: ts,
            call_volume,
            put_volume,
            call_open_interest: call_volume * 10,
            put_open_interest: put_volume * 10,
        }
    }

    #[test]
    fn query_returns_ascending_order() {
        let db = SqliteDb::in_memory().unwrap();
        db.upsert_sample(&sample("AAPL", 3000, 30, 10)).unwrap();
        db.upsert_sample(&sample("AAPL", 1000, 10, 10)).unwrap();
        db.upsert_sample(&sample("AAPL", 2000, 20, 10)).unwrap();
        // Other symbols stay out of the range scan.
        db.upsert_sample(&sample("MSFT", 1500, 5, 5)).unwrap();

        let rows = db.query_samples("AAPL", 0, 10_000).unwrap();
        let timestamps: Vec<i64> = rows.iter().map(|s| s.timestamp_millis).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
    }

    #[test]
    fn upsert_is_idempotent() {
        let db = SqliteDb::in_memory().unwrap();
        let s = sample("AAPL", 1000, 10, 5);
        db.upsert_sample(&s).unwrap();
        db.upsert_sample(&s).unwrap();

        let rows = db.query_samples("AAPL", 0, 2000).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], s);
    }

    #[test]
    fn upsert_replaces_on_conflict() {
        let db = SqliteDb::in_memory().unwrap();
        db.upsert_sample(&sample("AAPL", 1000, 10, 5)).unwrap();
        db.upsert_sample(&sample("AAPL", 1000, 20, 5)).unwrap();

        let rows = db.query_samples("AAPL", 0, 2000).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].call_volume, 20);
    }

    #[test]
    fn batch_upsert_lands_all_rows() {
        let db = SqliteDb::in_memory().unwrap();
        let samples = vec![sample("AAPL", 1000, 10, 5), sample("MSFT", 1000, 8, 4)];
        db.upsert_samples(&samples).unwrap();

        assert_eq!(db.query_samples("AAPL", 0, 2000).unwrap().len(), 1);
        assert_eq!(db.query_samples("MSFT", 0, 2000).unwrap().len(), 1);

        // Summary refreshed alongside the batch.
        let summary = db.activity_summary("AAPL").unwrap().unwrap();
        assert_eq!(summary.sample_count, 1);
        assert_eq!(summary.avg_call_put_ratio, Some(2.0));
    }

    #[test]
    fn prune_removes_only_expired_samples() {
        let db = SqliteDb::in_memory().unwrap();
        let now = chrono::Utc::now().timestamp_millis();
        let day = 24 * 60 * 60 * 1000_i64;

        db.upsert_sample(&sample("AAPL", now - 8 * day, 10, 5)).unwrap();
        db.upsert_sample(&sample("AAPL", now - day, 20, 5)).unwrap();

        let removed = db.prune_samples(Duration::from_secs(7 * 24 * 60 * 60)).unwrap();
        assert_eq!(removed, 1);

        let rows = db.query_samples("AAPL", 0, now + 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp_millis, now - day);
    }

    #[test]
    fn latest_two_returns_oldest_first() {
        let db = SqliteDb::in_memory().unwrap();
        db.upsert_sample(&sample("AAPL", 1000, 10, 10)).unwrap();
        db.upsert_sample(&sample("AAPL", 2000, 20, 10)).unwrap();
        db.upsert_sample(&sample("AAPL", 3000, 30, 10)).unwrap();

        let pair = db.latest_two_samples("AAPL").unwrap();
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].timestamp_millis, 2000);
        assert_eq!(pair[1].timestamp_millis, 3000);
    }

    #[test]
    fn watchlist_add_and_remove_are_idempotent() {
        let db = SqliteDb::in_memory().unwrap();
        assert!(db.watchlist_add("MSFT").unwrap());
        assert!(!db.watchlist_add("MSFT").unwrap());
        assert_eq!(db.watchlist().unwrap(), vec!["MSFT".to_string()]);

        assert!(!db.watchlist_remove("AAPL").unwrap());
        assert_eq!(db.watchlist().unwrap(), vec!["MSFT".to_string()]);

        assert!(db.watchlist_remove("MSFT").unwrap());
        assert!(db.watchlist().unwrap().is_empty());
    }

    #[test]
    fn watchlist_preserves_insertion_order() {
        let db = SqliteDb::in_memory().unwrap();
        for symbol in ["TSLA", "AAPL", "MSFT"] {
            db.watchlist_add(symbol).unwrap();
        }
        assert_eq!(db.watchlist().unwrap(), vec!["TSLA", "AAPL", "MSFT"]);
    }

    #[test]
    fn settings_defaults_apply_when_unset() {
        let db = SqliteDb::in_memory().unwrap();
        let settings = db.load_settings().unwrap();
        assert_eq!(settings.provider, ProviderKind::Mock);
        assert_eq!(settings.polling_interval_minutes, 10);
        assert!(!settings.polling_enabled);
        assert!(settings.alerts_enabled);
    }

    #[test]
    fn settings_round_trip_typed_values() {
        let db = SqliteDb::in_memory().unwrap();
        db.set_setting(SettingKey::Provider, "remote").unwrap();
        db.set_setting(SettingKey::ApiKey, "k-123").unwrap();
        db.set_setting(SettingKey::PollingEnabled, "true").unwrap();
        db.set_setting(SettingKey::PollingIntervalMinutes, "5").unwrap();

        let settings = db.load_settings().unwrap();
        assert_eq!(settings.provider, ProviderKind::Remote);
        assert_eq!(settings.api_key, "k-123");
        assert!(settings.polling_enabled);
        assert_eq!(settings.polling_interval_minutes, 5);
    }

    #[test]
    fn malformed_settings_fall_back_to_defaults() {
        let db = SqliteDb::in_memory().unwrap();
        db.set_setting(SettingKey::Provider, "carrier-pigeon").unwrap();
        db.set_setting(SettingKey::PollingIntervalMinutes, "soon").unwrap();
        db.set_setting(SettingKey::PollingEnabled, "maybe").unwrap();

        let settings = db.load_settings().unwrap();
        assert_eq!(settings.provider, ProviderKind::Mock);
        assert_eq!(settings.polling_interval_minutes, 10);
        assert!(!settings.polling_enabled);
    }
}

//! Daily retention scheduler
//!
//! Prunes old activity samples once at startup, then at every local
//! midnight. Runs independently of the polling loop.

use crate::db::sqlite::SqliteDb;
use chrono::{Local, Timelike};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Samples older than this are deleted (7 days)
pub const RETENTION_HORIZON: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub struct RetentionScheduler {
    db: Arc<SqliteDb>,
}

impl RetentionScheduler {
    pub fn new(db: Arc<SqliteDb>) -> Self {
        Self { db }
    }

    /// Seconds until the next local midnight
    pub fn duration_until_midnight() -> Duration {
        let now = Local::now().time();
        let remaining = 24 * 3600 - now.num_seconds_from_midnight() as u64;
        Duration::from_secs(remaining.max(1))
    }

    /// Start the scheduler: prune now, then at each midnight.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.prune();

            loop {
                let until = Self::duration_until_midnight();
                tracing::debug!(
                    "Next retention pass in {}h {}m",
                    until.as_secs() / 3600,
                    (until.as_secs() % 3600) / 60
                );
                tokio::time::sleep(until).await;
                self.prune();
            }
        })
    }

    fn prune(&self) {
        match self.db.prune_samples(RETENTION_HORIZON) {
            Ok(removed) => tracing::debug!(removed, "Retention pass completed"),
            Err(e) => tracing::warn!(error = %e, "Retention pass failed"),
        }
    }
}

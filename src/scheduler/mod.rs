//! Scheduled background tasks
//!
//! - Options-activity polling loop (settings-driven start/stop)
//! - Daily retention pruning of the time-series store

mod poller;
mod retention;

pub use poller::{supervise, ActivityPoller, PollerStatus};
pub use retention::{RetentionScheduler, RETENTION_HORIZON};

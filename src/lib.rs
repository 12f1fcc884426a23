//! Watchlist engine with unusual-options-activity polling
//!
//! The core behind a stock-watchlist app: search and quote lookups
//! through a pluggable provider (mock dataset or a remote quotes API),
//! a SQLite-backed watchlist, settings, and options-activity
//! time-series store, and a polling loop that periodically refreshes
//! activity data and raises threshold alerts. UI rendering, navigation,
//! and notification delivery are host concerns and live outside this
//! crate.

pub mod db;
pub mod error;
pub mod events;
pub mod providers;
pub mod scheduler;
pub mod services;
pub mod state;

pub use error::{AppError, Result};
pub use state::AppState;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for a host binary. `RUST_LOG` overrides
/// the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uoa_watchlist=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

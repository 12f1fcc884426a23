//! Application state management
//!
//! `AppState` is the explicit composition root: every component is
//! constructed here and handed its collaborators by `Arc`. There are no
//! implicit first-use singletons anywhere in the crate.

use crate::db::sqlite::SqliteDb;
use crate::error::Result;
use crate::events::EventBus;
use crate::providers::{ProviderSelector, QuoteProvider};
use crate::scheduler::{supervise, ActivityPoller, RetentionScheduler};
use crate::services::{SettingsService, WatchlistService};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared with the host (UI) layer
pub struct AppState {
    /// SQLite database connection
    pub db: Arc<SqliteDb>,

    /// Typed event bus
    pub events: Arc<EventBus>,

    /// Settings store (snapshot loaded during construction)
    pub settings: Arc<SettingsService>,

    /// Watchlist store
    pub watchlist: Arc<WatchlistService>,

    /// Effective-provider resolution
    pub provider_selector: Arc<ProviderSelector>,

    /// Options-activity polling loop
    pub poller: Arc<ActivityPoller>,

    /// Application data directory
    pub data_dir: PathBuf,
}

impl AppState {
    /// Create new application state rooted at a data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Data directory: {:?}", data_dir);

        let db = Arc::new(SqliteDb::new(&data_dir.join("watchlist.db"))?);
        Ok(Self::assemble(db, data_dir))
    }

    /// State over an in-memory database, used by tests
    pub fn in_memory() -> Result<Self> {
        let db = Arc::new(SqliteDb::in_memory()?);
        Ok(Self::assemble(db, PathBuf::new()))
    }

    fn assemble(db: Arc<SqliteDb>, data_dir: PathBuf) -> Self {
        let events = Arc::new(EventBus::new());
        let settings = Arc::new(SettingsService::new(Arc::clone(&db), Arc::clone(&events)));
        if let Err(e) = settings.load() {
            // A fresh database always loads; treat a failure here as
            // start-with-defaults rather than refusing to start.
            tracing::warn!(error = %e, "Failed to load settings, using defaults");
        }

        let watchlist = Arc::new(WatchlistService::new(Arc::clone(&db), Arc::clone(&events)));
        let provider_selector = Arc::new(ProviderSelector::new());
        let poller = Arc::new(ActivityPoller::new(
            Arc::clone(&db),
            Arc::clone(&settings),
            Arc::clone(&provider_selector),
            Arc::clone(&events),
        ));

        Self {
            db,
            events,
            settings,
            watchlist,
            provider_selector,
            poller,
            data_dir,
        }
    }

    /// Spawn the background tasks: the settings supervisor, the daily
    /// retention pass, and the polling loop when enabled in settings.
    /// Requires a running tokio runtime.
    pub fn start_background_tasks(&self) {
        tokio::spawn(supervise(
            Arc::clone(&self.poller),
            self.events.subscribe_settings(),
        ));

        RetentionScheduler::new(Arc::clone(&self.db)).start();

        if self.settings.snapshot().polling_enabled {
            self.poller.start();
        }

        tracing::info!("Background tasks started");
    }

    /// The effective quote provider for the current settings
    pub fn provider(&self) -> Arc<dyn QuoteProvider> {
        self.provider_selector.resolve(&self.settings.snapshot())
    }
}

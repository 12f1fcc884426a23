//! Typed event bus
//!
//! Components publish typed payloads on broadcast channels instead of
//! stringly-keyed emitter events; subscribers register per channel and
//! lagging subscribers drop old events rather than blocking publishers.

use crate::db::sqlite::models::SettingKey;
use crate::providers::types::ActivitySample;
use crate::services::alerts::AlertPayload;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// A settings value changed (already persisted when this fires)
#[derive(Debug, Clone)]
pub struct SettingsEvent {
    pub key: SettingKey,
}

/// The watchlist was mutated
#[derive(Debug, Clone)]
pub enum WatchlistEvent {
    Added(String),
    Removed(String),
}

/// Output of the polling loop
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A fetch cycle completed; carries the samples just stored
    Updated(Vec<ActivitySample>),
    /// An alert condition fired for a symbol
    Alert(AlertPayload),
}

/// Process-wide event bus, owned by the composition root
pub struct EventBus {
    settings_tx: broadcast::Sender<SettingsEvent>,
    watchlist_tx: broadcast::Sender<WatchlistEvent>,
    poll_tx: broadcast::Sender<PollEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (settings_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (watchlist_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (poll_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            settings_tx,
            watchlist_tx,
            poll_tx,
        }
    }

    pub fn subscribe_settings(&self) -> broadcast::Receiver<SettingsEvent> {
        self.settings_tx.subscribe()
    }

    pub fn subscribe_watchlist(&self) -> broadcast::Receiver<WatchlistEvent> {
        self.watchlist_tx.subscribe()
    }

    pub fn subscribe_poll(&self) -> broadcast::Receiver<PollEvent> {
        self.poll_tx.subscribe()
    }

    // Send errors only mean "no subscribers right now", which is fine.

    pub fn publish_settings(&self, event: SettingsEvent) {
        let _ = self.settings_tx.send(event);
    }

    pub fn publish_watchlist(&self, event: WatchlistEvent) {
        let _ = self.watchlist_tx.send(event);
    }

    pub fn publish_poll(&self, event: PollEvent) {
        let _ = self.poll_tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

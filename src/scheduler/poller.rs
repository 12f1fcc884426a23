//! Options-activity polling loop
//!
//! A two-state (stopped/running) repeating fetch-and-store cycle over
//! the watched symbols. Starting runs one cycle immediately, then every
//! interval. Stopping only prevents future fires; a cycle already in
//! flight completes and its writes land. Cycles are serialized on one
//! task; a tick that arrives mid-cycle is skipped rather than queued.

use crate::db::sqlite::models::SettingKey;
use crate::db::sqlite::SqliteDb;
use crate::events::{EventBus, PollEvent, SettingsEvent};
use crate::providers::ProviderSelector;
use crate::services::{alerts, SettingsService};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

/// Everything one fetch cycle needs, cloned into the polling task
#[derive(Clone)]
struct CycleDeps {
    db: Arc<SqliteDb>,
    settings: Arc<SettingsService>,
    selector: Arc<ProviderSelector>,
    events: Arc<EventBus>,
    last_cycle_millis: Arc<RwLock<Option<i64>>>,
}

/// Polling loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerStatus {
    Stopped,
    Running,
}

pub struct ActivityPoller {
    deps: CycleDeps,
    // Some(sender) while running; dropping the sender stops the task.
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl ActivityPoller {
    pub fn new(
        db: Arc<SqliteDb>,
        settings: Arc<SettingsService>,
        selector: Arc<ProviderSelector>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            deps: CycleDeps {
                db,
                settings,
                selector,
                events,
                last_cycle_millis: Arc::new(RwLock::new(None)),
            },
            stop_tx: Mutex::new(None),
        }
    }

    pub fn status(&self) -> PollerStatus {
        if self.stop_tx.lock().is_some() {
            PollerStatus::Running
        } else {
            PollerStatus::Stopped
        }
    }

    /// Wall-clock completion time of the most recent cycle, epoch millis
    pub fn last_cycle_completed(&self) -> Option<i64> {
        *self.deps.last_cycle_millis.read()
    }

    /// Start the repeating loop. No-op when already running.
    pub fn start(&self) {
        let mut guard = self.stop_tx.lock();
        if guard.is_some() {
            return;
        }

        let minutes = self.deps.settings.snapshot().polling_interval_minutes;
        let period = Duration::from_secs((minutes as u64) * 60);
        let (tx, mut rx) = watch::channel(false);
        let deps = self.deps.clone();

        tokio::spawn(async move {
            tracing::info!(interval_minutes = minutes, "Polling loop started");
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    // First tick completes immediately: one cycle up front.
                    _ = interval.tick() => run_cycle(&deps).await,
                    _ = rx.changed() => {
                        tracing::info!("Polling loop stopped");
                        break;
                    }
                }
            }
        });

        *guard = Some(tx);
    }

    /// Stop the loop. In-flight work completes; only future fires are
    /// prevented. No-op when already stopped.
    pub fn stop(&self) {
        if let Some(tx) = self.stop_tx.lock().take() {
            let _ = tx.send(true);
        }
    }

    /// Run a single fetch cycle outside the timer (on-demand refresh)
    pub async fn run_cycle_once(&self) {
        run_cycle(&self.deps).await;
    }

    /// React to a settings change
    pub fn apply_setting(&self, key: SettingKey) {
        match key {
            SettingKey::PollingEnabled => {
                if self.deps.settings.snapshot().polling_enabled {
                    self.start();
                } else {
                    self.stop();
                }
            }
            // Interval changes re-arm by stop-then-restart, never by
            // adjusting a live timer.
            SettingKey::PollingIntervalMinutes => {
                if self.status() == PollerStatus::Running {
                    self.stop();
                    self.start();
                }
            }
            SettingKey::ApiKey | SettingKey::Provider => {
                self.deps.selector.invalidate();
            }
            SettingKey::AlertsEnabled => {}
        }
    }
}

/// Drive poller transitions from settings change events. Spawned by the
/// composition root; exits when the settings channel closes.
pub async fn supervise(poller: Arc<ActivityPoller>, mut rx: broadcast::Receiver<SettingsEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => poller.apply_setting(event.key),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Settings event stream lagged, re-syncing poller");
                // Re-derive the enabled state rather than replaying.
                poller.apply_setting(SettingKey::PollingEnabled);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// One fetch-and-store cycle. Failures degrade to a skipped cycle; the
/// only user-visible symptom is a stale last-updated timestamp.
async fn run_cycle(deps: &CycleDeps) {
    let symbols = match deps.db.watchlist() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Fetch cycle could not read watchlist");
            return;
        }
    };

    if symbols.is_empty() {
        tracing::debug!("Watchlist empty, skipping fetch cycle");
        return;
    }

    let settings = deps.settings.snapshot();
    let provider = deps.selector.resolve(&settings);

    let samples = match provider.batch_activity(&symbols).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Fetch cycle provider call failed");
            return;
        }
    };

    if !samples.is_empty() {
        // The upsert is awaited before the event publishes, so
        // subscribers always observe durable data.
        if let Err(e) = deps.db.upsert_samples(&samples) {
            tracing::warn!(error = %e, "Fetch cycle failed to store samples");
            return;
        }
        deps.events
            .publish_poll(PollEvent::Updated(samples.clone()));
    }

    *deps.last_cycle_millis.write() = Some(chrono::Utc::now().timestamp_millis());
    tracing::debug!(
        symbols = symbols.len(),
        samples = samples.len(),
        "Fetch cycle completed"
    );

    if settings.alerts_enabled {
        for sample in &samples {
            match deps.db.latest_two_samples(&sample.symbol) {
                Ok(pair) if pair.len() == 2 => {
                    if let Some(alert) = alerts::evaluate(&pair[0], &pair[1]) {
                        deps.events.publish_poll(PollEvent::Alert(alert));
                    }
                }
                Ok(_) => {} // fewer than 2 samples, no alert
                Err(e) => {
                    tracing::warn!(symbol = %sample.symbol, error = %e, "Alert lookup failed")
                }
            }
        }
    }
}

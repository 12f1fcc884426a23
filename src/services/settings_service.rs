//! Settings Service
//!
//! Owns the in-memory settings snapshot. `load` must run once at
//! startup; after that, reads are synchronous from the snapshot while
//! writes persist to SQLite first, then update the snapshot and
//! broadcast the changed key.

use crate::db::sqlite::models::{ProviderKind, SettingKey, Settings};
use crate::db::sqlite::SqliteDb;
use crate::error::{AppError, Result};
use crate::events::{EventBus, SettingsEvent};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct SettingsService {
    db: Arc<SqliteDb>,
    events: Arc<EventBus>,
    snapshot: RwLock<Settings>,
}

impl SettingsService {
    pub fn new(db: Arc<SqliteDb>, events: Arc<EventBus>) -> Self {
        Self {
            db,
            events,
            snapshot: RwLock::new(Settings::default()),
        }
    }

    /// Populate the snapshot from durable storage
    pub fn load(&self) -> Result<()> {
        let settings = self.db.load_settings()?;
        *self.snapshot.write() = settings;
        tracing::debug!("Settings snapshot loaded");
        Ok(())
    }

    /// Current settings snapshot
    pub fn snapshot(&self) -> Settings {
        self.snapshot.read().clone()
    }

    pub async fn set_api_key(&self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim().to_string();
        self.db.set_setting(SettingKey::ApiKey, &api_key)?;
        self.snapshot.write().api_key = api_key;
        self.notify(SettingKey::ApiKey);
        Ok(())
    }

    pub async fn set_provider(&self, provider: ProviderKind) -> Result<()> {
        self.db.set_setting(SettingKey::Provider, provider.as_str())?;
        self.snapshot.write().provider = provider;
        self.notify(SettingKey::Provider);
        Ok(())
    }

    pub async fn set_polling_enabled(&self, enabled: bool) -> Result<()> {
        self.db
            .set_setting(SettingKey::PollingEnabled, &enabled.to_string())?;
        self.snapshot.write().polling_enabled = enabled;
        self.notify(SettingKey::PollingEnabled);
        Ok(())
    }

    pub async fn set_polling_interval_minutes(&self, minutes: i64) -> Result<()> {
        if minutes <= 0 {
            return Err(AppError::Validation(format!(
                "Polling interval must be positive, got {}",
                minutes
            )));
        }
        self.db
            .set_setting(SettingKey::PollingIntervalMinutes, &minutes.to_string())?;
        self.snapshot.write().polling_interval_minutes = minutes;
        self.notify(SettingKey::PollingIntervalMinutes);
        Ok(())
    }

    pub async fn set_alerts_enabled(&self, enabled: bool) -> Result<()> {
        self.db
            .set_setting(SettingKey::AlertsEnabled, &enabled.to_string())?;
        self.snapshot.write().alerts_enabled = enabled;
        self.notify(SettingKey::AlertsEnabled);
        Ok(())
    }

    fn notify(&self, key: SettingKey) {
        tracing::debug!(key = key.storage_key(), "Setting changed");
        self.events.publish_settings(SettingsEvent { key });
    }
}

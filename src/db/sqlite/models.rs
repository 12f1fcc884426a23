//! SQLite database models

use serde::{Deserialize, Serialize};

/// Which quote provider the user has selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Mock,
    Remote,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Mock => "mock",
            ProviderKind::Remote => "remote",
        }
    }

    /// Parse a stored value; anything unrecognized is `None` so the
    /// caller can fall back to the default.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mock" => Some(ProviderKind::Mock),
            "remote" => Some(ProviderKind::Remote),
            _ => None,
        }
    }
}

/// Enumerable settings keys. Each key has a fixed storage name and a
/// default used when the row is absent or unparsable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    ApiKey,
    Provider,
    PollingEnabled,
    PollingIntervalMinutes,
    AlertsEnabled,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::ApiKey,
        SettingKey::Provider,
        SettingKey::PollingEnabled,
        SettingKey::PollingIntervalMinutes,
        SettingKey::AlertsEnabled,
    ];

    pub fn storage_key(&self) -> &'static str {
        match self {
            SettingKey::ApiKey => "api_key",
            SettingKey::Provider => "provider",
            SettingKey::PollingEnabled => "polling_enabled",
            SettingKey::PollingIntervalMinutes => "polling_interval_minutes",
            SettingKey::AlertsEnabled => "alerts_enabled",
        }
    }
}

/// Settings snapshot. Values are persisted as stringified primitives in
/// the key/value settings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub provider: ProviderKind,
    pub polling_enabled: bool,
    pub polling_interval_minutes: i64,
    pub alerts_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            provider: ProviderKind::Mock,
            polling_enabled: false,
            polling_interval_minutes: 10,
            alerts_enabled: true,
        }
    }
}

/// Per-symbol rolling summary derived from stored activity samples.
/// Advisory data only; never load-bearing for correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub symbol: String,
    pub avg_call_put_ratio: Option<f64>,
    pub sample_count: i64,
}

//! Settings persistence
//!
//! String-keyed key/value rows; booleans and integers are stored as
//! their string encodings. Absent or unparsable values fall back to the
//! key's default rather than erroring.

use crate::db::sqlite::models::{ProviderKind, SettingKey, Settings};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// Get a raw stored value
pub fn get_raw(conn: &Connection, key: SettingKey) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key.storage_key()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Set a raw value, replacing any existing row for the key
pub fn set_raw(conn: &Connection, key: SettingKey, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key.storage_key(), value],
    )?;
    Ok(())
}

fn parse_bool(key: SettingKey, raw: &str, default: bool) -> bool {
    match raw {
        "true" | "1" => true,
        "false" | "0" => false,
        other => {
            tracing::warn!(key = key.storage_key(), value = other, "Discarding malformed stored setting");
            default
        }
    }
}

fn parse_i64(key: SettingKey, raw: &str, default: i64) -> i64 {
    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(key = key.storage_key(), value = raw, "Discarding malformed stored setting");
            default
        }
    }
}

/// Load the full settings snapshot, applying defaults for absent keys
/// and discarding malformed stored values.
pub fn load(conn: &Connection) -> Result<Settings> {
    let defaults = Settings::default();
    let mut settings = defaults.clone();

    for key in SettingKey::ALL {
        let Some(raw) = get_raw(conn, key)? else {
            continue;
        };

        match key {
            SettingKey::ApiKey => settings.api_key = raw,
            SettingKey::Provider => {
                settings.provider = match ProviderKind::parse(&raw) {
                    Some(kind) => kind,
                    None => {
                        tracing::warn!(value = %raw, "Discarding malformed provider setting");
                        defaults.provider
                    }
                }
            }
            SettingKey::PollingEnabled => {
                settings.polling_enabled = parse_bool(key, &raw, defaults.polling_enabled)
            }
            SettingKey::PollingIntervalMinutes => {
                let minutes = parse_i64(key, &raw, defaults.polling_interval_minutes);
                // A non-positive interval would spin the poller.
                settings.polling_interval_minutes = if minutes > 0 {
                    minutes
                } else {
                    defaults.polling_interval_minutes
                };
            }
            SettingKey::AlertsEnabled => {
                settings.alerts_enabled = parse_bool(key, &raw, defaults.alerts_enabled)
            }
        }
    }

    Ok(settings)
}

//! Services Layer
//!
//! Business logic sitting between the (out-of-scope) UI surface and the
//! storage/provider layers.
//!
//! - `SettingsService` - typed settings with snapshot reads and change events
//! - `WatchlistService` - tracked-symbol set with change events
//! - `alerts` - threshold evaluation over stored activity samples

pub mod alerts;
pub mod settings_service;
pub mod watchlist_service;

pub use settings_service::SettingsService;
pub use watchlist_service::WatchlistService;

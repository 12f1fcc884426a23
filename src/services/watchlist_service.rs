//! Watchlist Service
//!
//! Add/remove/list of tracked tickers. Symbols are trimmed and
//! uppercased on the way in; both mutations are idempotent and return
//! the resulting list. Effective mutations broadcast a watchlist event;
//! no-ops stay silent.

use crate::db::sqlite::SqliteDb;
use crate::error::{AppError, Result};
use crate::events::{EventBus, WatchlistEvent};
use std::sync::Arc;

pub struct WatchlistService {
    db: Arc<SqliteDb>,
    events: Arc<EventBus>,
}

impl WatchlistService {
    pub fn new(db: Arc<SqliteDb>, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    fn normalize(symbol: &str) -> Result<String> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(AppError::Validation("Symbol must not be empty".to_string()));
        }
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
            return Err(AppError::Validation(format!("Invalid symbol: {}", symbol)));
        }
        Ok(symbol)
    }

    /// Add a symbol; returns the updated list
    pub async fn add(&self, symbol: &str) -> Result<Vec<String>> {
        let symbol = Self::normalize(symbol)?;
        if self.db.watchlist_add(&symbol)? {
            tracing::info!(%symbol, "Added to watchlist");
            self.events.publish_watchlist(WatchlistEvent::Added(symbol));
        }
        self.db.watchlist()
    }

    /// Remove a symbol; returns the updated list
    pub async fn remove(&self, symbol: &str) -> Result<Vec<String>> {
        let symbol = Self::normalize(symbol)?;
        if self.db.watchlist_remove(&symbol)? {
            tracing::info!(%symbol, "Removed from watchlist");
            self.events
                .publish_watchlist(WatchlistEvent::Removed(symbol));
        }
        self.db.watchlist()
    }

    /// Watched symbols in insertion order
    pub async fn list(&self) -> Result<Vec<String>> {
        self.db.watchlist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (WatchlistService, Arc<EventBus>) {
        let events = Arc::new(EventBus::new());
        let svc = WatchlistService::new(Arc::new(SqliteDb::in_memory().unwrap()), events.clone());
        (svc, events)
    }

    #[tokio::test]
    async fn add_uppercases_and_deduplicates() {
        let (svc, _) = service();
        assert_eq!(svc.add("msft").await.unwrap(), vec!["MSFT"]);
        assert_eq!(svc.add(" MSFT ").await.unwrap(), vec!["MSFT"]);
    }

    #[tokio::test]
    async fn remove_of_absent_symbol_is_a_noop() {
        let (svc, _) = service();
        svc.add("AAPL").await.unwrap();
        assert_eq!(svc.remove("MSFT").await.unwrap(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn only_effective_mutations_emit_events() {
        let (svc, events) = service();
        let mut rx = events.subscribe_watchlist();

        svc.add("AAPL").await.unwrap();
        svc.add("AAPL").await.unwrap(); // no-op, no event
        svc.remove("AAPL").await.unwrap();

        assert!(matches!(rx.try_recv().unwrap(), WatchlistEvent::Added(s) if s == "AAPL"));
        assert!(matches!(rx.try_recv().unwrap(), WatchlistEvent::Removed(s) if s == "AAPL"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejects_garbage_symbols() {
        let (svc, _) = service();
        assert!(svc.add("").await.is_err());
        assert!(svc.add("A PL").await.is_err());
    }
}

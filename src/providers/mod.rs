//! Quote provider adapters module

pub mod types;
pub mod mock;
pub mod remote;

use crate::db::sqlite::models::{ProviderKind, Settings};
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use types::*;

/// Provider trait that all quote-data implementations must implement.
///
/// All operations fail soft: transient network or parse failures for an
/// individual symbol are logged and that symbol is omitted (batch) or
/// `None` is returned (single). Callers never see transport errors.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider ID (e.g., "mock", "remote")
    fn id(&self) -> &'static str;

    /// Search for symbols matching a free-text query
    async fn search(&self, query: &str) -> Result<Vec<Quote>>;

    /// Get a quote for a single symbol
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>>;

    /// Get quotes for several symbols, omitting symbols that fail
    async fn batch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>>;

    /// Get the current options-activity sample for a symbol
    async fn options_activity(&self, symbol: &str) -> Result<Option<ActivitySample>>;

    /// Get options-activity samples for several symbols, omitting
    /// symbols that fail
    async fn batch_activity(&self, symbols: &[String]) -> Result<Vec<ActivitySample>>;
}

/// Resolves the effective provider from settings and caches the choice.
///
/// The remote provider is only selected when the provider setting is
/// `remote` AND a non-empty API key is configured; otherwise the mock
/// provider is used. The resolution is cached until `invalidate()` is
/// called (driven by settings change events), not re-checked per call.
pub struct ProviderSelector {
    cached: RwLock<Option<Arc<dyn QuoteProvider>>>,
}

impl ProviderSelector {
    pub fn new() -> Self {
        Self {
            cached: RwLock::new(None),
        }
    }

    /// Get the effective provider for the given settings snapshot.
    pub fn resolve(&self, settings: &Settings) -> Arc<dyn QuoteProvider> {
        if let Some(provider) = self.cached.read().as_ref() {
            return Arc::clone(provider);
        }

        let provider: Arc<dyn QuoteProvider> =
            if settings.provider == ProviderKind::Remote && !settings.api_key.is_empty() {
                Arc::new(remote::RemoteProvider::new(settings.api_key.clone()))
            } else {
                if settings.provider == ProviderKind::Remote {
                    tracing::warn!("Remote provider selected but no API key set, using mock data");
                }
                Arc::new(mock::MockProvider::new())
            };

        tracing::info!(provider = provider.id(), "Resolved quote provider");
        *self.cached.write() = Some(Arc::clone(&provider));
        provider
    }

    /// Drop the cached provider so the next `resolve` re-inspects settings.
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: ProviderKind, api_key: &str) -> Settings {
        Settings {
            api_key: api_key.to_string(),
            provider,
            ..Settings::default()
        }
    }

    #[test]
    fn remote_without_key_falls_back_to_mock() {
        let selector = ProviderSelector::new();
        let provider = selector.resolve(&settings(ProviderKind::Remote, ""));
        assert_eq!(provider.id(), "mock");
    }

    #[test]
    fn remote_with_key_selects_remote() {
        let selector = ProviderSelector::new();
        let provider = selector.resolve(&settings(ProviderKind::Remote, "test-key"));
        assert_eq!(provider.id(), "remote");
    }

    #[test]
    fn selection_is_cached_until_invalidated() {
        let selector = ProviderSelector::new();
        let provider = selector.resolve(&settings(ProviderKind::Mock, ""));
        assert_eq!(provider.id(), "mock");

        // Still mock: the cache is only dropped on invalidate.
        let provider = selector.resolve(&settings(ProviderKind::Remote, "test-key"));
        assert_eq!(provider.id(), "mock");

        selector.invalidate();
        let provider = selector.resolve(&settings(ProviderKind::Remote, "test-key"));
        assert_eq!(provider.id(), "remote");
    }

    #[tokio::test]
    async fn fallback_behaves_like_mock_for_quotes() {
        let selector = ProviderSelector::new();
        let fallback = selector.resolve(&settings(ProviderKind::Remote, ""));

        let quote = fallback.quote("AAPL").await.unwrap();
        assert!(quote.is_some());
        assert_eq!(quote.unwrap().symbol, "AAPL");
    }
}

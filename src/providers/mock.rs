//! Mock quote provider
//!
//! Serves a static dataset of well-known tickers with a bounded random
//! walk applied per call, so the UI sees movement without a network or
//! an API key. Not seeded: successive calls return different values.

use crate::error::Result;
use crate::providers::types::{ActivitySample, Quote};
use crate::providers::QuoteProvider;
use async_trait::async_trait;
use rand::Rng;

/// (symbol, name, base price, base daily volume)
const DATASET: &[(&str, &str, f64, i64)] = &[
    ("AAPL", "Apple Inc.", 192.50, 54_000_000),
    ("MSFT", "Microsoft Corporation", 428.70, 21_000_000),
    ("GOOGL", "Alphabet Inc.", 173.90, 26_000_000),
    ("AMZN", "Amazon.com, Inc.", 186.30, 39_000_000),
    ("NVDA", "NVIDIA Corporation", 126.40, 310_000_000),
    ("META", "Meta Platforms, Inc.", 514.20, 14_000_000),
    ("TSLA", "Tesla, Inc.", 221.10, 95_000_000),
    ("JPM", "JPMorgan Chase & Co.", 208.80, 8_500_000),
    ("V", "Visa Inc.", 277.40, 5_800_000),
    ("NFLX", "Netflix, Inc.", 672.90, 3_100_000),
];

/// Mock provider over the static dataset
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    fn entry(symbol: &str) -> Option<&'static (&'static str, &'static str, f64, i64)> {
        DATASET.iter().find(|(s, ..)| *s == symbol)
    }

    /// Perturb the base price by ±2% and base volume by ±20%.
    fn perturbed_quote(symbol: &str, name: &str, base_price: f64, base_volume: i64) -> Quote {
        let mut rng = rand::thread_rng();
        let price_factor: f64 = rng.gen_range(-0.02..=0.02);
        let volume_factor: f64 = rng.gen_range(-0.20..=0.20);

        let last = base_price * (1.0 + price_factor);
        let volume = ((base_volume as f64) * (1.0 + volume_factor)) as i64;

        Quote::from_closes(symbol, name, last, base_price, volume, None)
    }

    fn synthetic_activity(symbol: &str, base_volume: i64) -> ActivitySample {
        let mut rng = rand::thread_rng();
        // Options volume roughly tracks a small fraction of share volume.
        let scale = (base_volume / 1_000).max(100);
        let call_volume = rng.gen_range(scale / 2..=scale * 2);
        let put_volume = rng.gen_range(scale / 2..=scale * 2);

        ActivitySample {
            symbol: symbol.to_string(),
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
            call_volume,
            put_volume,
            call_open_interest: call_volume * rng.gen_range(5..=15),
            put_open_interest: put_volume * rng.gen_range(5..=15),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<Quote>> {
        let needle = query.trim().to_uppercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let results = DATASET
            .iter()
            .filter(|(symbol, name, ..)| {
                symbol.contains(&needle) || name.to_uppercase().contains(&needle)
            })
            .map(|(symbol, name, price, volume)| {
                Self::perturbed_quote(symbol, name, *price, *volume)
            })
            .collect();

        Ok(results)
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let symbol = symbol.trim().to_uppercase();
        Ok(Self::entry(&symbol)
            .map(|(s, name, price, volume)| Self::perturbed_quote(s, name, *price, *volume)))
    }

    async fn batch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(quote) = self.quote(symbol).await? {
                quotes.push(quote);
            }
        }
        Ok(quotes)
    }

    async fn options_activity(&self, symbol: &str) -> Result<Option<ActivitySample>> {
        let symbol = symbol.trim().to_uppercase();
        Ok(Self::entry(&symbol).map(|(s, _, _, volume)| Self::synthetic_activity(s, *volume)))
    }

    async fn batch_activity(&self, symbols: &[String]) -> Result<Vec<ActivitySample>> {
        let mut samples = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(sample) = self.options_activity(symbol).await? {
                samples.push(sample);
            }
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quote_stays_within_walk_bounds() {
        let provider = MockProvider::new();
        let quote = provider.quote("AAPL").await.unwrap().unwrap();
        assert!(quote.price >= 192.50 * 0.98 && quote.price <= 192.50 * 1.02);
        assert!(quote.volume >= 0);
    }

    #[tokio::test]
    async fn unknown_symbol_yields_none() {
        let provider = MockProvider::new();
        assert!(provider.quote("ZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_matches_symbol_and_name() {
        let provider = MockProvider::new();
        let by_symbol = provider.search("msft").await.unwrap();
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].symbol, "MSFT");

        let by_name = provider.search("apple").await.unwrap();
        assert!(by_name.iter().any(|q| q.symbol == "AAPL"));
    }

    #[tokio::test]
    async fn batch_omits_unknown_symbols() {
        let provider = MockProvider::new();
        let symbols = vec!["AAPL".to_string(), "ZZZZ".to_string(), "MSFT".to_string()];
        let quotes = provider.batch_quotes(&symbols).await.unwrap();
        assert_eq!(quotes.len(), 2);

        let samples = provider.batch_activity(&symbols).await.unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.call_volume >= 0 && s.put_volume >= 0));
    }
}

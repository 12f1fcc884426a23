//! Remote quote provider
//!
//! Thin HTTP adapter over a third-party quotes API. The API key is
//! appended as a query parameter on every request. All calls degrade
//! gracefully: a network or parse failure for an individual symbol is
//! logged and that symbol is simply missing from the result.

use crate::error::Result;
use crate::providers::types::{ActivitySample, Quote};
use crate::providers::QuoteProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.marketdata.example.com/v2";

/// How many search hits get enriched with a per-symbol detail call.
const SEARCH_ENRICH_LIMIT: usize = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    ticker: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[allow(dead_code)]
    ticker: Option<String>,
    last: Option<f64>,
    #[serde(rename = "prevClose")]
    prev_close: Option<f64>,
    volume: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CompanyData {
    name: Option<String>,
    #[serde(rename = "marketCap")]
    market_cap: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ActivityData {
    #[serde(rename = "callVolume")]
    call_volume: Option<i64>,
    #[serde(rename = "putVolume")]
    put_volume: Option<i64>,
    #[serde(rename = "callOpenInterest")]
    call_open_interest: Option<i64>,
    #[serde(rename = "putOpenInterest")]
    put_open_interest: Option<i64>,
}

/// Remote provider backed by the quotes HTTP API
pub struct RemoteProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl RemoteProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Construct against a non-default endpoint (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// GET a JSON payload, mapping any transport or decode failure to `None`.
    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, &str)],
    ) -> Option<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut query: Vec<(&str, &str)> = vec![("token", self.api_key.as_str())];
        query.extend_from_slice(extra_query);

        let response = match self.client.get(&url).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path, error = %e, "Quote API request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(path, status = %response.status(), "Quote API returned error status");
            return None;
        }

        match response.json::<T>().await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(path, error = %e, "Quote API response failed to parse");
                None
            }
        }
    }

    /// Fetch quote detail plus company metadata for one symbol.
    async fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        let data: QuoteData = self.fetch(&format!("/stock/{}/quote", symbol), &[]).await?;
        let last = data.last?;

        let company: Option<CompanyData> =
            self.fetch(&format!("/stock/{}/company", symbol), &[]).await;
        let (name, market_cap) = company
            .map(|c| (c.name.unwrap_or_default(), c.market_cap))
            .unwrap_or_default();

        Some(Quote::from_closes(
            symbol,
            name,
            last,
            data.prev_close.unwrap_or(0.0),
            data.volume.unwrap_or(0),
            market_cap,
        ))
    }
}

#[async_trait]
impl QuoteProvider for RemoteProvider {
    fn id(&self) -> &'static str {
        "remote"
    }

    async fn search(&self, query: &str) -> Result<Vec<Quote>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let response: Option<SearchResponse> = self.fetch("/search", &[("query", query)]).await;
        let hits = match response {
            Some(r) => r.results,
            None => return Ok(Vec::new()),
        };

        // Enrich the first few hits with real quote data; hits past the
        // limit (and hits whose detail call fails) are dropped.
        let mut quotes = Vec::new();
        for hit in hits.into_iter().take(SEARCH_ENRICH_LIMIT) {
            let symbol = hit.ticker.to_uppercase();
            if let Some(mut quote) = self.fetch_quote(&symbol).await {
                if quote.name.is_empty() {
                    quote.name = hit.name;
                }
                quotes.push(quote);
            }
        }

        Ok(quotes)
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let symbol = symbol.trim().to_uppercase();
        Ok(self.fetch_quote(&symbol).await)
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
        let data: Option<ActivityData> = self
            .fetch(&format!("/stock/{}/options-activity", symbol), &[])
            .await;

        Ok(data.map(|d| ActivitySample {
            symbol,
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
            call_volume: d.call_volume.unwrap_or(0),
            put_volume: d.put_volume.unwrap_or(0),
            call_open_interest: d.call_open_interest.unwrap_or(0),
            put_open_interest: d.put_open_interest.unwrap_or(0),
        }))
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

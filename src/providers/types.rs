//! Common provider types

use serde::{Deserialize, Serialize};

/// Quote for a single symbol. Transient: recomputed on every fetch,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: i64,
    pub market_cap: Option<i64>,
}

impl Quote {
    /// Build a quote from last price and previous close, deriving the
    /// change fields. Percent change is 0 when the previous close is 0.
    pub fn from_closes(
        symbol: impl Into<String>,
        name: impl Into<String>,
        last: f64,
        prev_close: f64,
        volume: i64,
        market_cap: Option<i64>,
    ) -> Self {
        let change = last - prev_close;
        let change_percent = if prev_close != 0.0 {
            change / prev_close * 100.0
        } else {
            0.0
        };
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price: last,
            change,
            change_percent,
            volume,
            market_cap,
        }
    }
}

/// One options-activity sample for a symbol at a point in time.
/// Identity is (symbol, timestamp_millis); a later write with the same
/// key replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySample {
    pub symbol: String,
    pub timestamp_millis: i64,
    pub call_volume: i64,
    pub put_volume: i64,
    pub call_open_interest: i64,
    pub put_open_interest: i64,
}

impl ActivitySample {
    /// Call/put volume ratio. Undefined when put volume is zero.
    pub fn call_put_ratio(&self) -> Option<f64> {
        if self.put_volume > 0 {
            Some(self.call_volume as f64 / self.put_volume as f64)
        } else {
            None
        }
    }

    /// Combined call + put volume.
    pub fn total_volume(&self) -> i64 {
        self.call_volume + self.put_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_percent_derives_from_prev_close() {
        let q = Quote::from_closes("AAPL", "Apple Inc.", 110.0, 100.0, 1_000, None);
        assert!((q.change - 10.0).abs() < 1e-9);
        assert!((q.change_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn change_percent_zero_when_no_prev_close() {
        let q = Quote::from_closes("IPO", "Fresh Listing", 25.0, 0.0, 0, None);
        assert_eq!(q.change_percent, 0.0);
    }

    #[test]
    fn ratio_undefined_for_zero_put_volume() {
        let sample = ActivitySample {
            symbol: "AAPL".into(),
            timestamp_millis: 1_000,
            call_volume: 500,
            put_volume: 0,
            call_open_interest: 0,
            put_open_interest: 0,
        };
        assert_eq!(sample.call_put_ratio(), None);
    }

    #[test]
    fn ratio_defined_otherwise() {
        let sample = ActivitySample {
            symbol: "AAPL".into(),
            timestamp_millis: 1_000,
            call_volume: 300,
            put_volume: 100,
            call_open_interest: 0,
            put_open_interest: 0,
        };
        assert_eq!(sample.call_put_ratio(), Some(3.0));
    }
}

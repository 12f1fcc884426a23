//! Unusual-activity alert evaluation
//!
//! Compares the two most recent activity samples for a symbol against
//! fixed thresholds and produces an alert payload when one trips.
//! Delivery (notification banner, sound, push) belongs to the host
//! platform; this module's responsibility ends at the payload.

use crate::providers::types::ActivitySample;
use serde::{Deserialize, Serialize};

/// Relative call/put ratio swing that counts as unusual (50%)
const RATIO_SWING_THRESHOLD: f64 = 0.5;

/// Crossing above this ratio is a bullish signal
const BULLISH_RATIO: f64 = 3.0;

/// Crossing below this ratio is a bearish signal
const BEARISH_RATIO: f64 = 0.5;

/// Total-volume growth that counts as unusual (more than doubled)
const VOLUME_GROWTH_THRESHOLD: f64 = 1.0;

/// Direction read of a fired alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertClass {
    Bullish,
    Bearish,
    NeutralUnusual,
}

impl AlertClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertClass::Bullish => "bullish",
            AlertClass::Bearish => "bearish",
            AlertClass::NeutralUnusual => "neutral-unusual",
        }
    }
}

/// Alert produced by the polling loop, handed to the notification surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub symbol: String,
    pub timestamp_millis: i64,
    pub class: AlertClass,
    /// Latest call/put ratio; absent when put volume was zero
    pub ratio: Option<f64>,
    pub title: String,
    pub body: String,
}

/// Evaluate the alert condition for one symbol given its previous and
/// latest samples. Returns `None` when nothing unusual happened.
pub fn evaluate(prev: &ActivitySample, latest: &ActivitySample) -> Option<AlertPayload> {
    let prev_ratio = prev.call_put_ratio();
    let latest_ratio = latest.call_put_ratio();

    let mut fired = false;

    if let (Some(p), Some(l)) = (prev_ratio, latest_ratio) {
        if p != 0.0 && ((l - p) / p).abs() > RATIO_SWING_THRESHOLD {
            fired = true;
        }
        if l > BULLISH_RATIO && p <= BULLISH_RATIO {
            fired = true;
        }
        if l < BEARISH_RATIO && p >= BEARISH_RATIO {
            fired = true;
        }
    }

    let prev_total = prev.total_volume();
    if prev_total > 0 {
        let growth = (latest.total_volume() - prev_total) as f64 / prev_total as f64;
        if growth > VOLUME_GROWTH_THRESHOLD {
            fired = true;
        }
    }

    if !fired {
        return None;
    }

    let class = match latest_ratio {
        Some(r) if r > BULLISH_RATIO => AlertClass::Bullish,
        Some(r) if r < BEARISH_RATIO => AlertClass::Bearish,
        _ => AlertClass::NeutralUnusual,
    };

    let ratio_text = latest_ratio
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| "n/a".to_string());
    let title = format!("Unusual options activity: {}", latest.symbol);
    let body = format!(
        "{} call/put ratio {} ({})",
        latest.symbol,
        ratio_text,
        class.as_str()
    );

    tracing::info!(
        symbol = %latest.symbol,
        class = class.as_str(),
        ratio = ratio_text,
        "Alert fired"
    );

    Some(AlertPayload {
        symbol: latest.symbol.clone(),
        timestamp_millis: latest.timestamp_millis,
        class,
        ratio: latest_ratio,
        title,
        body,
    })
}

//! Market data module
//!
//! OHLCV windows and the access seam to the exchange. The scanner treats
//! every data problem — short history, out-of-order bars, timeouts — as
//! "unavailable" and abstains for that symbol; nothing here can fail a sweep.

mod kucoin;

pub use kucoin::{KucoinClient, KucoinConfig};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A single OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

/// Evaluation timeframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// Short horizon, fine granularity
    Min15,
    /// Long horizon, used for directional bias
    Hour1,
}

impl Timeframe {
    /// KuCoin kline type code
    pub fn code(&self) -> &'static str {
        match self {
            Timeframe::Min15 => "15min",
            Timeframe::Hour1 => "1hour",
        }
    }
}

/// Market data errors, all treated as abstention by the scanner
#[derive(Debug, Error)]
pub enum DataError {
    /// Exchange returned no usable bars
    #[error("no data for {symbol} {timeframe:?}")]
    Unavailable {
        symbol: String,
        timeframe: Timeframe,
    },
    /// Bars were not strictly ascending in time
    #[error("non-monotonic timestamps for {symbol}")]
    NonMonotonic { symbol: String },
    /// Transport failure (HTTP error, timeout)
    #[error("fetch failed: {0}")]
    Transport(#[from] anyhow::Error),
}

/// Immutable rolling window of bars for one symbol and timeframe.
///
/// Strictly increasing timestamps are enforced at construction; the window is
/// replaced wholesale on the next fetch, never mutated.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    bars: Vec<Bar>,
}

impl PriceWindow {
    /// Build a window, rejecting out-of-order or duplicate timestamps.
    pub fn new(symbol: &str, bars: Vec<Bar>) -> Result<Self, DataError> {
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(DataError::NonMonotonic {
                    symbol: symbol.to_string(),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Bar counting backwards from the latest (`back(0)` is the last bar).
    pub fn back(&self, n: usize) -> Option<&Bar> {
        if n >= self.bars.len() {
            return None;
        }
        self.bars.get(self.bars.len() - 1 - n)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// Access seam to the exchange
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch up to `count` bars in ascending time order.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<PriceWindow, DataError>;

    /// List tradable symbols with quote volume at or above the floor.
    async fn list_symbols(&self, min_quote_volume: f64) -> anyhow::Result<Vec<String>>;

    /// Current 24h quote volume per symbol.
    async fn current_volumes(&self) -> anyhow::Result<HashMap<String, f64>>;
}

/// Percentile rank of each scanned symbol's volume within the scanned set.
///
/// Rank is the fraction of symbols with volume at or below the symbol's own,
/// so the largest symbol maps to 1.0.
pub fn volume_percentiles(
    symbols: &[String],
    volumes: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    let vals: Vec<f64> = symbols
        .iter()
        .map(|s| volumes.get(s).copied().unwrap_or(0.0))
        .collect();
    if vals.is_empty() {
        return HashMap::new();
    }
    let mut sorted = vals.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;

    symbols
        .iter()
        .zip(vals)
        .map(|(s, v)| {
            let rank = sorted.iter().filter(|x| **x <= v).count() as f64;
            (s.clone(), rank / n)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bar(ts_offset_min: i64, close: f64) -> Bar {
        let base = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Bar {
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
            timestamp: base + Duration::minutes(ts_offset_min),
        }
    }

    #[test]
    fn test_window_accepts_ascending() {
        let window =
            PriceWindow::new("BTC-USDT", vec![bar(0, 10.0), bar(15, 11.0), bar(30, 12.0)]).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window.last().unwrap().close, 12.0);
        assert_eq!(window.back(1).unwrap().close, 11.0);
        assert!(window.back(3).is_none());
    }

    #[test]
    fn test_window_rejects_duplicate_timestamp() {
        let result = PriceWindow::new("BTC-USDT", vec![bar(0, 10.0), bar(0, 11.0)]);
        assert!(matches!(result, Err(DataError::NonMonotonic { .. })));
    }

    #[test]
    fn test_window_rejects_out_of_order() {
        let result = PriceWindow::new("BTC-USDT", vec![bar(15, 10.0), bar(0, 11.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeframe_codes() {
        assert_eq!(Timeframe::Min15.code(), "15min");
        assert_eq!(Timeframe::Hour1.code(), "1hour");
    }

    #[test]
    fn test_volume_percentiles() {
        let symbols: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let mut volumes = HashMap::new();
        volumes.insert("A".to_string(), 100.0);
        volumes.insert("B".to_string(), 400.0);
        volumes.insert("C".to_string(), 200.0);
        // D missing -> treated as zero volume

        let pct = volume_percentiles(&symbols, &volumes);
        assert_eq!(pct["B"], 1.0);
        assert_eq!(pct["D"], 0.25);
        assert!(pct["A"] < pct["C"]);
    }

    #[test]
    fn test_volume_percentiles_empty() {
        assert!(volume_percentiles(&[], &HashMap::new()).is_empty());
    }
}

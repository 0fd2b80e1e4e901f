//! Shared fixtures for integration tests

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use trendscout::data::{Bar, DataError, MarketData, PriceWindow, Timeframe};
use trendscout::delivery::{DeliverySink, Signal};

pub fn window_from(symbol: &str, candles: &[(f64, f64, f64, f64, f64)]) -> PriceWindow {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let bars = candles
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| Bar {
            timestamp: base + Duration::minutes(15 * i as i64),
            open,
            high,
            low,
            close,
            volume,
        })
        .collect();
    PriceWindow::new(symbol, bars).unwrap()
}

pub fn flat_window(symbol: &str, len: usize, price: f64) -> PriceWindow {
    let candles: Vec<_> = (0..len)
        .map(|_| (price, price + 0.5, price - 0.5, price, 100.0))
        .collect();
    window_from(symbol, &candles)
}

pub fn rising_window(symbol: &str, len: usize, start: f64, step: f64) -> PriceWindow {
    let candles: Vec<_> = (0..len)
        .map(|i| {
            let open = start + step * i as f64;
            let close = open + step;
            (open, close + 0.1, open - 0.1, close, 100.0)
        })
        .collect();
    window_from(symbol, &candles)
}

/// A flat base followed by a channel breakout and a retest bar.
pub fn breakout_window(symbol: &str) -> PriceWindow {
    let mut candles: Vec<(f64, f64, f64, f64, f64)> = (0..98)
        .map(|_| (100.0, 100.5, 99.5, 100.0, 100.0))
        .collect();
    candles.push((100.0, 101.6, 99.9, 101.5, 180.0));
    candles.push((100.8, 102.0, 100.6, 101.9, 200.0));
    window_from(symbol, &candles)
}

pub struct StaticMarket {
    windows: HashMap<String, (PriceWindow, PriceWindow)>,
}

impl StaticMarket {
    pub fn new(entries: Vec<(&str, PriceWindow, PriceWindow)>) -> Self {
        let windows = entries
            .into_iter()
            .map(|(s, ltf, htf)| (s.to_string(), (ltf, htf)))
            .collect();
        Self { windows }
    }
}

#[async_trait]
impl MarketData for StaticMarket {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        _count: usize,
    ) -> Result<PriceWindow, DataError> {
        self.windows
            .get(symbol)
            .map(|(ltf, htf)| match timeframe {
                Timeframe::Min15 => ltf.clone(),
                Timeframe::Hour1 => htf.clone(),
            })
            .ok_or_else(|| DataError::Unavailable {
                symbol: symbol.to_string(),
                timeframe,
            })
    }

    async fn list_symbols(&self, _min_quote_volume: f64) -> anyhow::Result<Vec<String>> {
        let mut symbols: Vec<String> = self.windows.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    async fn current_volumes(&self) -> anyhow::Result<HashMap<String, f64>> {
        Ok(self
            .windows
            .keys()
            .map(|s| (s.clone(), 1_000_000.0))
            .collect())
    }
}

/// Sink recording every delivered signal; can be switched to fail.
pub struct CollectSink {
    pub delivered: Mutex<Vec<Signal>>,
    pub fail: Mutex<bool>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliverySink for CollectSink {
    async fn deliver(&self, signal: &Signal) -> anyhow::Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("sink unavailable");
        }
        self.delivered.lock().unwrap().push(signal.clone());
        Ok(())
    }
}

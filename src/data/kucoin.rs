//! KuCoin REST client
//!
//! Implements [`MarketData`](super::MarketData) against the public KuCoin
//! spot API: kline history, the symbol list filtered to USDT quotes, and the
//! all-tickers volume snapshot. Responses arrive newest-first with string
//! fields; everything is normalized to ascending-time [`Bar`]s here.

use super::{Bar, DataError, MarketData, PriceWindow, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// KuCoin public API base URL
pub const KUCOIN_API_URL: &str = "https://api.kucoin.com";

/// Configuration for the KuCoin client
#[derive(Debug, Clone)]
pub struct KucoinConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Quote currency filter for the universe
    pub quote_currency: String,
}

impl Default for KucoinConfig {
    fn default() -> Self {
        Self {
            base_url: KUCOIN_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            quote_currency: "USDT".to_string(),
        }
    }
}

/// Client for the public KuCoin spot API
pub struct KucoinClient {
    config: KucoinConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct KlineResponse {
    #[serde(default)]
    data: Vec<[String; 7]>,
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    #[serde(default)]
    data: Vec<SymbolEntry>,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    symbol: String,
    #[serde(rename = "quoteCurrency")]
    quote_currency: String,
    #[serde(rename = "enableTrading", default)]
    enable_trading: bool,
}

#[derive(Debug, Deserialize)]
struct AllTickersResponse {
    data: AllTickersData,
}

#[derive(Debug, Deserialize)]
struct AllTickersData {
    #[serde(default)]
    ticker: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    symbol: String,
    /// 24h quote volume, stringly typed by the exchange
    #[serde(rename = "volValue", default)]
    vol_value: Option<String>,
}

impl KucoinClient {
    /// Create a client with default configuration
    pub fn new() -> Self {
        Self::with_config(KucoinConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: KucoinConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn parse_bar(raw: &[String; 7]) -> Option<Bar> {
        let secs: i64 = raw[0].parse().ok()?;
        let timestamp = DateTime::<Utc>::from_timestamp(secs, 0)?;
        Some(Bar {
            open: raw[1].parse().ok()?,
            close: raw[2].parse().ok()?,
            high: raw[3].parse().ok()?,
            low: raw[4].parse().ok()?,
            volume: raw[5].parse().ok()?,
            timestamp,
        })
    }
}

impl Default for KucoinClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketData for KucoinClient {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<PriceWindow, DataError> {
        let url = format!("{}/api/v1/market/candles", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("type", timeframe.code()), ("symbol", symbol)])
            .send()
            .await
            .map_err(|e| DataError::Transport(e.into()))?;

        if !response.status().is_success() {
            return Err(DataError::Unavailable {
                symbol: symbol.to_string(),
                timeframe,
            });
        }

        let klines: KlineResponse = response
            .json()
            .await
            .map_err(|e| DataError::Transport(e.into()))?;

        let mut bars: Vec<Bar> = klines.data.iter().filter_map(Self::parse_bar).collect();
        bars.sort_by_key(|b| b.timestamp);
        if bars.len() > count {
            bars.drain(..bars.len() - count);
        }
        if bars.is_empty() {
            return Err(DataError::Unavailable {
                symbol: symbol.to_string(),
                timeframe,
            });
        }

        PriceWindow::new(symbol, bars)
    }

    async fn list_symbols(&self, min_quote_volume: f64) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/api/v2/symbols", self.config.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("KuCoin symbols error: {}", response.status());
        }
        let symbols: SymbolsResponse = response.json().await?;

        let mut pairs: Vec<String> = symbols
            .data
            .into_iter()
            .filter(|s| s.quote_currency == self.config.quote_currency && s.enable_trading)
            .map(|s| s.symbol)
            .collect();

        if min_quote_volume > 0.0 {
            let volumes = self.current_volumes().await?;
            pairs.retain(|s| volumes.get(s).copied().unwrap_or(0.0) >= min_quote_volume);
        }

        tracing::debug!(universe = pairs.len(), "Listed tradable symbols");
        Ok(pairs)
    }

    async fn current_volumes(&self) -> anyhow::Result<HashMap<String, f64>> {
        let url = format!("{}/api/v1/market/allTickers", self.config.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("KuCoin tickers error: {}", response.status());
        }
        let tickers: AllTickersResponse = response.json().await?;

        Ok(tickers
            .data
            .ticker
            .into_iter()
            .map(|t| {
                let volume = t
                    .vol_value
                    .as_deref()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0);
                (t.symbol, volume)
            })
            .collect())
    }
}

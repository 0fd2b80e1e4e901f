//! Band mean-reversion evaluator
//!
//! Active only when the higher timeframe is not trending; mutually exclusive
//! with the breakout evaluator by construction. Fades a band poke: previous
//! close outside the Bollinger band, current close back inside near the edge,
//! with an oversold/overbought oscillator, a strong re-entry candle, and a
//! volume push.

use super::{htf_bias, windows_ok, Bias, Candidate, Regime, Side, Strategy};
use crate::config::{Config, RangeConfig, RiskConfig};
use crate::data::PriceWindow;
use crate::indicators::{adx, atr_wilder, body_strength, bollinger_last, rsi, sma_last};
use crate::risk::compute_levels;

/// Fractional distance from the band edge still counted as "at the edge".
const EDGE_EPS: f64 = 0.001;

pub struct RangeStrategy {
    cfg: RangeConfig,
    risk: RiskConfig,
    adx_trend_min: f64,
    ltf_min: usize,
    htf_min: usize,
}

impl RangeStrategy {
    pub fn new(config: &Config) -> Self {
        Self {
            cfg: config.range.clone(),
            risk: config.risk.clone(),
            adx_trend_min: config.trend.adx_trend_min,
            ltf_min: config.data.ltf_min_bars,
            htf_min: config.data.htf_min_bars,
        }
    }

    fn build(
        &self,
        ltf: &PriceWindow,
        symbol: &str,
        side: Side,
        rsi_last: f64,
        bandwidth: f64,
    ) -> Option<Candidate> {
        let entry = ltf.last()?.close;
        let atr_value = *atr_wilder(&ltf.highs(), &ltf.lows(), &ltf.closes(), 14).last()?;
        let levels = compute_levels(side, entry, atr_value, &self.risk).ok()?;

        let extremity = match side {
            Side::Long => (38.0 - rsi_last).max(0.0),
            Side::Short => (rsi_last - 62.0).max(0.0),
        };
        let tightness = (1.0 - bandwidth / self.cfg.bandwidth_max) * 10.0;
        let score = 30.0 + extremity + tightness;
        let reason = format!("band re-entry fade | RSI={rsi_last:.0} bw={bandwidth:.3}");

        Candidate::new(
            symbol,
            side,
            Regime::Range,
            entry,
            levels.stop,
            levels.targets,
            score,
            reason,
            ltf,
        )
    }
}

impl Strategy for RangeStrategy {
    fn regime(&self) -> Regime {
        Regime::Range
    }

    fn analyze(&self, ltf: &PriceWindow, htf: &PriceWindow, symbol: &str) -> Option<Candidate> {
        if !windows_ok(ltf, htf, self.ltf_min, self.htf_min) {
            return None;
        }

        // Ranging regime only: the trend evaluator owns everything above the
        // ADX gate.
        let adx_htf = *adx(&htf.highs(), &htf.lows(), &htf.closes(), 14).last()?;
        if !adx_htf.is_finite() || adx_htf >= self.adx_trend_min {
            return None;
        }
        let bias = htf_bias(htf, 50);

        let closes = ltf.closes();
        let n = closes.len();
        let close = closes[n - 1];
        let prev_close = closes[n - 2];

        let band = bollinger_last(&closes, self.cfg.bb_period, self.cfg.bb_k)?;
        if band.bandwidth > self.cfg.bandwidth_max {
            return None;
        }
        let prev_band = bollinger_last(&closes[..n - 1], self.cfg.bb_period, self.cfg.bb_k)?;

        let rsi_line = rsi(&closes, 14);
        let rsi_last = *rsi_line.last()?;
        if !rsi_last.is_finite() {
            return None;
        }

        let last = *ltf.last()?;
        let body = body_strength(last.open, last.high, last.low, last.close);
        if body < self.cfg.body_min {
            return None;
        }
        let vol_avg = sma_last(&ltf.volumes(), 20)?;
        if last.volume <= vol_avg * self.cfg.vol_mult {
            return None;
        }

        let long_setup = rsi_last < self.cfg.rsi_long
            && prev_close < prev_band.lower
            && close > band.lower
            && close <= band.lower * (1.0 + EDGE_EPS)
            && last.close > last.open
            && !bias.opposes(Side::Long);
        if long_setup {
            return self.build(ltf, symbol, Side::Long, rsi_last, band.bandwidth);
        }

        let short_setup = rsi_last > self.cfg.rsi_short
            && prev_close > prev_band.upper
            && close < band.upper
            && close >= band.upper * (1.0 - EDGE_EPS)
            && last.close < last.open
            && !bias.opposes(Side::Short);
        if short_setup {
            return self.build(ltf, symbol, Side::Short, rsi_last, band.bandwidth);
        }

        None
    }
}

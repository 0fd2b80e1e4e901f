//! Breakout/retest trend evaluator
//!
//! Requires a trending higher timeframe (ADX gate plus a recent displacement
//! candle), then looks for a channel breakout on the short window in the bias
//! direction, confirmed either by a retest of the broken level with a strong
//! directional candle or by short-timeframe momentum.

use super::{htf_bias, ltf_momentum_ok, windows_ok, Bias, Candidate, Regime, Side, Strategy};
use crate::config::{Config, RiskConfig, TrendConfig};
use crate::data::PriceWindow;
use crate::indicators::{adx, atr_wilder, body_strength, donchian_prev};
use crate::risk::{compute_levels, reward_risk};

pub struct TrendStrategy {
    cfg: TrendConfig,
    risk: RiskConfig,
    ltf_min: usize,
    htf_min: usize,
}

impl TrendStrategy {
    pub fn new(config: &Config) -> Self {
        Self {
            cfg: config.trend.clone(),
            risk: config.risk.clone(),
            ltf_min: config.data.ltf_min_bars,
            htf_min: config.data.htf_min_bars,
        }
    }

    /// Higher-timeframe gate: trend strength and a displacement candle.
    /// Returns the ADX reading when both hold.
    fn htf_gate(&self, htf: &PriceWindow) -> Option<f64> {
        let adx_line = adx(&htf.highs(), &htf.lows(), &htf.closes(), 14);
        let adx_last = *adx_line.last()?;
        if !adx_last.is_finite() || adx_last < self.cfg.adx_trend_min {
            return None;
        }

        let displaced = (0..self.cfg.disp_lookback).any(|i| {
            htf.back(i)
                .map(|b| body_strength(b.open, b.high, b.low, b.close) >= self.cfg.disp_body_min)
                .unwrap_or(false)
        });
        displaced.then_some(adx_last)
    }

    /// Retest: the latest bar touches back within tolerance of the broken
    /// level and closes strongly in the trade direction.
    fn retest_ok(&self, ltf: &PriceWindow, side: Side, level: f64, atr_value: f64) -> bool {
        let last = match ltf.last() {
            Some(b) => *b,
            None => return false,
        };
        let tolerance = self.cfg.retest_tol_atr * atr_value;
        let range = (last.high - last.low).max(1e-12);
        match side {
            Side::Long => {
                last.low <= level + tolerance
                    && last.close > last.open
                    && (last.close - last.open) / range > 0.55
            }
            Side::Short => {
                last.high >= level - tolerance
                    && last.close < last.open
                    && (last.open - last.close) / range > 0.55
            }
        }
    }

    fn build(
        &self,
        ltf: &PriceWindow,
        symbol: &str,
        side: Side,
        adx_htf: f64,
        atr_value: f64,
        retested: bool,
    ) -> Option<Candidate> {
        let close = ltf.last()?.close;
        let levels = compute_levels(side, close, atr_value, &self.risk).ok()?;
        let rr1 = reward_risk(side, close, &levels);

        let last = ltf.last()?;
        let bs = body_strength(last.open, last.high, last.low, last.close);
        let mut score =
            40.0 + (20.0_f64).min((adx_htf - self.cfg.adx_trend_min) * 1.2) + bs * 10.0;
        if rr1 < 1.0 {
            score -= 4.0;
        }

        let confirmation = if retested { "retest" } else { "momentum" };
        let reason = format!("channel breakout + {confirmation} | 1h ADX={adx_htf:.1}");

        let mut candidate = Candidate::new(
            symbol,
            side,
            Regime::Trend,
            close,
            levels.stop,
            levels.targets,
            score,
            reason,
            ltf,
        )?;
        candidate.has_confirmation = retested;
        Some(candidate)
    }
}

impl Strategy for TrendStrategy {
    fn regime(&self) -> Regime {
        Regime::Trend
    }

    fn analyze(&self, ltf: &PriceWindow, htf: &PriceWindow, symbol: &str) -> Option<Candidate> {
        if !windows_ok(ltf, htf, self.ltf_min, self.htf_min) {
            return None;
        }
        let bias = htf_bias(htf, 50);
        if bias == Bias::Neutral {
            return None;
        }
        let adx_htf = self.htf_gate(htf)?;

        let highs = ltf.highs();
        let lows = ltf.lows();
        let closes = ltf.closes();
        let n = closes.len();
        let close = closes[n - 1];
        let prev_close = closes[n - 2];

        let atr_line = atr_wilder(&highs, &lows, &closes, 14);
        let atr_value = *atr_line.last()?;

        // Channel as it stood at the breakout bar: exclude the latest bar and
        // the breakout bar itself.
        let (chan_high, chan_low) =
            donchian_prev(&highs[..n - 1], &lows[..n - 1], self.cfg.donchian_window)?;

        match bias {
            Bias::Long => {
                let broke =
                    prev_close > chan_high * (1.0 + self.cfg.break_buffer) && close >= prev_close;
                if !broke {
                    return None;
                }
                let retested = self.retest_ok(ltf, Side::Long, chan_high, atr_value);
                if !retested && !ltf_momentum_ok(ltf, Side::Long) {
                    return None;
                }
                self.build(ltf, symbol, Side::Long, adx_htf, atr_value, retested)
            }
            Bias::Short => {
                let broke =
                    prev_close < chan_low * (1.0 - self.cfg.break_buffer) && close <= prev_close;
                if !broke {
                    return None;
                }
                let retested = self.retest_ok(ltf, Side::Short, chan_low, atr_value);
                if !retested && !ltf_momentum_ok(ltf, Side::Short) {
                    return None;
                }
                self.build(ltf, symbol, Side::Short, adx_htf, atr_value, retested)
            }
            Bias::Neutral => None,
        }
    }
}

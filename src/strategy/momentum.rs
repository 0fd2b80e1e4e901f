//! Momentum breakout and pre-break early trigger
//!
//! Confirmed mode takes a channel breakout in the moving-average direction
//! once the configured confirmation rule passes. Early mode fires just before
//! the break when price coils against the channel edge, with relaxed
//! confirmation thresholds and a bonus when the higher timeframe already
//! trends in the signal direction.

use super::{htf_bias, Bias, Candidate, Regime, Side, Strategy};
use crate::config::{Config, ConfirmMode, MomentumConfig, RiskConfig};
use crate::data::PriceWindow;
use crate::indicators::{adx, atr_wilder, body_strength, donchian_prev, ema, sma_last};
use crate::risk::compute_levels;

/// Both windows need at least this many bars; shorter history abstains.
const MIN_BARS: usize = 50;

pub struct MomentumStrategy {
    cfg: MomentumConfig,
    risk: RiskConfig,
    donchian_window: usize,
    break_buffer: f64,
    adx_trend_min: f64,
}

/// Thresholds fed to the confirmation rule; early mode relaxes them.
#[derive(Clone, Copy)]
struct ConfirmParams {
    body_min: f64,
    rel_vol: f64,
    net_body: f64,
}

impl MomentumStrategy {
    pub fn new(config: &Config) -> Self {
        Self {
            cfg: config.momentum.clone(),
            risk: config.risk.clone(),
            donchian_window: config.trend.donchian_window,
            break_buffer: config.trend.break_buffer,
            adx_trend_min: config.trend.adx_trend_min,
        }
    }

    fn confirm(&self, ltf: &PriceWindow, side: Side, params: ConfirmParams) -> bool {
        if self.cfg.confirm_mode == ConfirmMode::Off {
            return true;
        }
        let bars = ltf.bars();
        if bars.len() < 21 {
            return false;
        }
        let last3 = &bars[bars.len() - 3..];
        if last3.iter().any(|b| b.high - b.low <= 0.0) {
            return false;
        }

        let dir_ok = |b: &crate::data::Bar| match side {
            Side::Long => b.close > b.open,
            Side::Short => b.close < b.open,
        };
        let bodies: Vec<f64> = last3
            .iter()
            .map(|b| body_strength(b.open, b.high, b.low, b.close))
            .collect();

        let two_of_three = last3.iter().filter(|&b| dir_ok(b)).count() >= 2;
        let ema_volume = || {
            let closes = ltf.closes();
            let ema21 = *ema(&closes, 21).last().unwrap_or(&f64::NAN);
            let vol_avg = match sma_last(&ltf.volumes(), 20) {
                Some(v) => v,
                None => return false,
            };
            let side_ok = match side {
                Side::Long => closes[closes.len() - 1] > ema21,
                Side::Short => closes[closes.len() - 1] < ema21,
            };
            side_ok && last3[2].volume > vol_avg * params.rel_vol
        };

        match self.cfg.confirm_mode {
            ConfirmMode::Off => true,
            ConfirmMode::Strict3 => {
                last3.iter().all(|b| dir_ok(b))
                    && bodies[0] >= params.body_min
                    && bodies[1] >= params.body_min
            }
            ConfirmMode::TwoOfThree => two_of_three,
            ConfirmMode::NetBody => {
                let net: f64 = last3
                    .iter()
                    .zip(&bodies)
                    .map(|(b, body)| if b.close >= b.open { *body } else { -body })
                    .sum();
                match side {
                    Side::Long => net >= params.net_body,
                    Side::Short => net <= -params.net_body,
                }
            }
            ConfirmMode::EmaVolume => ema_volume(),
            ConfirmMode::Hybrid => two_of_three || ema_volume(),
        }
    }

    fn build(
        &self,
        ltf: &PriceWindow,
        symbol: &str,
        side: Side,
        regime: Regime,
        score: f64,
        atr_value: f64,
        reason: String,
    ) -> Option<Candidate> {
        let entry = ltf.last()?.close;
        let levels = compute_levels(side, entry, atr_value, &self.risk).ok()?;
        Candidate::new(
            symbol,
            side,
            regime,
            entry,
            levels.stop,
            levels.targets,
            score,
            reason,
            ltf,
        )
    }
}

impl Strategy for MomentumStrategy {
    fn regime(&self) -> Regime {
        Regime::Momentum
    }

    fn analyze(&self, ltf: &PriceWindow, htf: &PriceWindow, symbol: &str) -> Option<Candidate> {
        if ltf.len() < MIN_BARS || htf.len() < MIN_BARS {
            return None;
        }

        let highs = ltf.highs();
        let lows = ltf.lows();
        let closes = ltf.closes();
        let close = *closes.last()?;

        let atr_value = *atr_wilder(&highs, &lows, &closes, 14).last()?;
        if !(atr_value > 0.0) {
            return None;
        }
        // Volatility and extension guards: too hot, or too far from the mean,
        // and chasing is the likely outcome.
        if atr_value / close > self.cfg.max_atr_pct {
            return None;
        }
        let ema21 = *ema(&closes, 21).last()?;
        if (close - ema21).abs() > self.cfg.max_ema_dist_atr * atr_value {
            return None;
        }

        let side = if close > ema21 {
            Side::Long
        } else if close < ema21 {
            Side::Short
        } else {
            return None;
        };
        let bias = htf_bias(htf, 50);
        if bias.opposes(side) {
            return None;
        }

        let (chan_high, chan_low) = donchian_prev(&highs, &lows, self.donchian_window)?;

        let broke = match side {
            Side::Long => close > chan_high * (1.0 + self.break_buffer),
            Side::Short => close < chan_low * (1.0 - self.break_buffer),
        };
        let strict = ConfirmParams {
            body_min: self.cfg.body_min,
            rel_vol: self.cfg.rel_vol,
            net_body: self.cfg.net_body_threshold,
        };
        if broke && self.confirm(ltf, side, strict) {
            let reason = format!("confirmed channel break {side}");
            return self.build(ltf, symbol, side, Regime::Momentum, 50.0, atr_value, reason);
        }

        if !self.cfg.early_enabled {
            return None;
        }
        let edge_dist = match side {
            Side::Long => chan_high - close,
            Side::Short => close - chan_low,
        };
        if edge_dist < 0.0 || edge_dist > self.cfg.prebreak_atr * atr_value {
            return None;
        }
        let relaxed = ConfirmParams {
            body_min: self.cfg.early_body_min,
            rel_vol: self.cfg.early_rel_vol,
            net_body: self.cfg.net_body_threshold * 0.85,
        };
        if !self.confirm(ltf, side, relaxed) {
            return None;
        }

        let reason = format!("pre-break coil at channel edge {side}");
        let mut candidate =
            self.build(ltf, symbol, side, Regime::PreBreak, 45.0, atr_value, reason)?;
        let adx_htf = *adx(&htf.highs(), &htf.lows(), &htf.closes(), 14).last()?;
        if adx_htf.is_finite() && adx_htf >= self.adx_trend_min {
            candidate.early_bonus = self.cfg.early_adx_bonus;
        }
        Some(candidate)
    }
}

//! Liquidity sweep / character-change evaluator
//!
//! Looks for a stop run through the prior swing point followed by a close
//! through the most recent opposing minor swing. Entries are placed inside an
//! imbalance gap left by the impulse leg, or in the deep retracement band of
//! that leg when gaps are not required.

use super::{htf_bias, windows_ok, Bias, Candidate, Regime, Side, Strategy};
use crate::config::{Config, RiskConfig, StructureConfig};
use crate::data::PriceWindow;
use crate::indicators::{atr_wilder, find_gaps, find_swings};
use crate::risk::{compute_levels, reward_risk};

pub struct StructureStrategy {
    cfg: StructureConfig,
    risk: RiskConfig,
    ltf_min: usize,
    htf_min: usize,
}

impl StructureStrategy {
    pub fn new(config: &Config) -> Self {
        Self {
            cfg: config.structure.clone(),
            risk: config.risk.clone(),
            ltf_min: config.data.ltf_min_bars,
            htf_min: config.data.htf_min_bars,
        }
    }

    /// Entry zone for an impulse leg ending at `close`: the imbalance gap when
    /// one exists, otherwise the configured retracement band of the leg.
    /// `None` when a gap is required but absent.
    fn entry_zone(
        &self,
        ltf: &PriceWindow,
        side: Side,
        close: f64,
        leg: f64,
    ) -> Option<(f64, f64, &'static str)> {
        let (bull_gap, bear_gap) =
            find_gaps(&ltf.highs(), &ltf.lows(), self.cfg.gap_lookback);
        let gap = match side {
            Side::Long => bull_gap,
            Side::Short => bear_gap,
        };
        if let Some((lo, hi)) = gap {
            return Some((lo, hi, "gap"));
        }
        if self.cfg.require_gap {
            return None;
        }
        let zone = match side {
            Side::Long => (
                close - self.cfg.retrace_high * leg,
                close - self.cfg.retrace_low * leg,
            ),
            Side::Short => (
                close + self.cfg.retrace_low * leg,
                close + self.cfg.retrace_high * leg,
            ),
        };
        Some((zone.0, zone.1, "retracement"))
    }

    fn build(
        &self,
        ltf: &PriceWindow,
        symbol: &str,
        side: Side,
        entry: f64,
        atr_value: f64,
        zone_label: &str,
    ) -> Option<Candidate> {
        let levels = compute_levels(side, entry, atr_value, &self.risk).ok()?;
        let rr1 = reward_risk(side, entry, &levels);
        let score = 45.0 + (15.0_f64).min(rr1 * 10.0);
        let reason = format!("liquidity sweep + structure break | {zone_label} entry");

        let mut candidate = Candidate::new(
            symbol,
            side,
            Regime::Structure,
            entry,
            levels.stop,
            levels.targets,
            score,
            reason,
            ltf,
        )?;
        candidate.has_confirmation = true;
        Some(candidate)
    }
}

impl Strategy for StructureStrategy {
    fn regime(&self) -> Regime {
        Regime::Structure
    }

    fn analyze(&self, ltf: &PriceWindow, htf: &PriceWindow, symbol: &str) -> Option<Candidate> {
        if !windows_ok(ltf, htf, self.ltf_min, self.htf_min) {
            return None;
        }
        let bias = htf_bias(htf, 50);
        if bias == Bias::Neutral {
            return None;
        }

        let highs = ltf.highs();
        let lows = ltf.lows();
        let closes = ltf.closes();
        let close = *closes.last()?;

        let (swing_highs, swing_lows) =
            find_swings(&highs, &lows, self.cfg.swing_left, self.cfg.swing_right);
        let atr_value = *atr_wilder(&highs, &lows, &closes, 14).last()?;

        match bias {
            Bias::Long => {
                if swing_lows.len() < 2 {
                    return None;
                }
                let prior = swing_lows[swing_lows.len() - 2];
                let sweep = swing_lows[swing_lows.len() - 1];

                // Stop run: the latest swing low pierces the prior one but its
                // close recovers above it.
                let swept = lows[sweep] < lows[prior] * (1.0 - self.cfg.sweep_eps)
                    && closes[sweep] > lows[prior];
                if !swept {
                    return None;
                }

                // Character change: close through the most recent minor swing
                // high.
                let broken_high = swing_highs.last().map(|&i| highs[i])?;
                if close <= broken_high * (1.0 + self.cfg.break_eps) {
                    return None;
                }

                let leg = close - lows[sweep];
                if leg / close < self.cfg.min_leg_pct {
                    return None;
                }

                let (lo, hi, label) = self.entry_zone(ltf, Side::Long, close, leg)?;
                self.build(ltf, symbol, Side::Long, (lo + hi) / 2.0, atr_value, label)
            }
            Bias::Short => {
                if swing_highs.len() < 2 {
                    return None;
                }
                let prior = swing_highs[swing_highs.len() - 2];
                let sweep = swing_highs[swing_highs.len() - 1];

                let swept = highs[sweep] > highs[prior] * (1.0 + self.cfg.sweep_eps)
                    && closes[sweep] < highs[prior];
                if !swept {
                    return None;
                }

                let broken_low = swing_lows.last().map(|&i| lows[i])?;
                if close >= broken_low * (1.0 - self.cfg.break_eps) {
                    return None;
                }

                let leg = highs[sweep] - close;
                if leg / close < self.cfg.min_leg_pct {
                    return None;
                }

                let (lo, hi, label) = self.entry_zone(ltf, Side::Short, close, leg)?;
                self.build(ltf, symbol, Side::Short, (lo + hi) / 2.0, atr_value, label)
            }
            Bias::Neutral => None,
        }
    }
}

//! Feature extraction, linear scoring and probability calibration

use super::learner::sigmoid;
use super::{FeatureVector, OnlineLogit};
use crate::config::{Config, ScoringConfig};
use crate::data::PriceWindow;
use crate::indicators::{adx, atr_wilder, bollinger_last};
use crate::strategy::{htf_bias, ltf_momentum_ok, Candidate, Regime, Side};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct ScoringEngine {
    cfg: ScoringConfig,
    /// ADX floor shared with the trend gate; normalization starts here.
    adx_trend_min: f64,
    /// Bandwidth ceiling shared with the range evaluator.
    bandwidth_max: f64,
    learner: Option<Mutex<OnlineLogit>>,
    /// Symbols with a recent tracked loss, mapped to remaining armed sweeps.
    /// The single mutable read path in the concurrent phase: reading the
    /// feature decrements the counter, at most once per symbol per sweep.
    penalties: Mutex<HashMap<String, u32>>,
}

impl ScoringEngine {
    pub fn new(config: &Config) -> Self {
        let learner = config
            .learner
            .enabled
            .then(|| Mutex::new(OnlineLogit::new(&config.learner)));
        Self {
            cfg: config.scoring.clone(),
            adx_trend_min: config.trend.adx_trend_min,
            bandwidth_max: config.range.bandwidth_max,
            learner,
            penalties: Mutex::new(HashMap::new()),
        }
    }

    pub fn extract_features(
        &self,
        ltf: &PriceWindow,
        htf: &PriceWindow,
        candidate: &Candidate,
        volume_rank: f64,
        recent_penalty: f64,
    ) -> FeatureVector {
        let highs = ltf.highs();
        let lows = ltf.lows();
        let closes = ltf.closes();
        let close = closes.last().copied().unwrap_or(f64::NAN);

        let adx_value = adx(&highs, &lows, &closes, 14)
            .last()
            .copied()
            .unwrap_or(f64::NAN);
        let trend_strength = if adx_value.is_finite() {
            ((adx_value - self.adx_trend_min) / 20.0).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let rr1 = match candidate.side {
            Side::Long => {
                (candidate.targets[0] - candidate.entry)
                    / (candidate.entry - candidate.stop).max(1e-9)
            }
            Side::Short => {
                (candidate.entry - candidate.targets[0])
                    / (candidate.stop - candidate.entry).max(1e-9)
            }
        };

        let bandwidth_edge = bollinger_last(&closes, 20, 2.0)
            .map(|b| (1.0 - b.bandwidth / self.bandwidth_max.max(1e-6)).max(0.0))
            .unwrap_or(0.0);

        let atr_pct = atr_wilder(&highs, &lows, &closes, 14)
            .last()
            .map(|a| a / (close + 1e-12))
            .unwrap_or(f64::NAN);
        let vol_sweet_spot = if atr_pct >= self.cfg.sweet_atr_min && atr_pct <= self.cfg.sweet_atr_max
        {
            1.0
        } else {
            0.0
        };

        FeatureVector {
            htf_align: if htf_bias(htf, 50).matches(candidate.side) {
                1.0
            } else {
                0.0
            },
            trend_strength,
            ltf_momentum: if ltf_momentum_ok(ltf, candidate.side) {
                1.0
            } else {
                0.0
            },
            reward_risk: ((rr1 - 0.8) / 1.6).clamp(0.0, 1.0),
            bandwidth_edge,
            retest_or_gap: if candidate.has_confirmation { 1.0 } else { 0.0 },
            vol_sweet_spot,
            volume_rank: volume_rank.clamp(0.0, 1.0),
            recent_penalty,
        }
    }

    /// Base plus weighted feature contributions, floored at zero.
    pub fn linear_score(&self, features: &FeatureVector) -> f64 {
        let w = &self.cfg.weights;
        let score = self.cfg.base
            + w.htf_align * features.htf_align
            + w.trend_strength * features.trend_strength
            + w.ltf_momentum * features.ltf_momentum
            + w.reward_risk * features.reward_risk
            + w.bandwidth_edge * features.bandwidth_edge
            + w.retest_or_gap * features.retest_or_gap
            + w.vol_sweet_spot * features.vol_sweet_spot
            + w.volume_rank * features.volume_rank
            + w.recent_penalty * features.recent_penalty;
        score.max(0.0)
    }

    /// Non-linear overrides on top of the linear score.
    pub fn apply_hard_rules(&self, mut score: f64, features: &FeatureVector, candidate: &Candidate) -> f64 {
        if features.htf_align < 1.0 {
            score -= 10.0;
        }
        // No measurable trend strength at all disqualifies outright
        if features.trend_strength < 0.10 {
            score = 0.0;
        }
        if candidate.regime == Regime::Range && features.bandwidth_edge < 0.20 {
            score -= 6.0;
        }
        if candidate.regime == Regime::PreBreak {
            score += candidate.early_bonus;
        }
        score.max(0.0)
    }

    /// Fixed logistic calibration from score to success probability.
    pub fn score_to_probability(&self, score: f64) -> f64 {
        sigmoid(self.cfg.calib_slope * score + self.cfg.calib_intercept)
    }

    /// Full pipeline: extract features, score, calibrate, blend with the
    /// learner, and attach everything to the candidate.
    pub fn evaluate(
        &self,
        candidate: &mut Candidate,
        ltf: &PriceWindow,
        htf: &PriceWindow,
        volume_rank: f64,
        recent_penalty: f64,
    ) {
        let features = self.extract_features(ltf, htf, candidate, volume_rank, recent_penalty);
        let score = self.apply_hard_rules(self.linear_score(&features), &features, candidate);
        let probability = self.score_to_probability(score);

        candidate.score = score;
        candidate.probability = probability;
        candidate.blended_probability = match &self.learner {
            Some(model) => (probability + model.lock().expect("learner lock").predict(&features)) / 2.0,
            None => probability,
        };
        candidate.features = Some(features);
    }

    /// Feed one resolved outcome to the learner.
    pub fn record_outcome(&self, features: &FeatureVector, won: bool) {
        if let Some(model) = &self.learner {
            model.lock().expect("learner lock").update(features, won);
        }
    }

    /// Arm the recency penalty after a stopped-out signal.
    pub fn mark_loss(&self, symbol: &str) {
        self.penalties
            .lock()
            .expect("penalty lock")
            .insert(symbol.to_string(), self.cfg.penalty_decay);
    }

    pub fn learner_samples(&self) -> u64 {
        self.learner
            .as_ref()
            .map(|m| m.lock().expect("learner lock").samples_seen())
            .unwrap_or(0)
    }

    /// Read-and-decrement of the armed penalty counter. Called exactly once
    /// per symbol per sweep, before the candidates are scored, so every
    /// evaluator's features see the same value.
    pub fn consume_penalty(&self, symbol: &str) -> f64 {
        let mut map = self.penalties.lock().expect("penalty lock");
        match map.get_mut(symbol) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    map.remove(symbol);
                }
                1.0
            }
            _ => 0.0,
        }
    }
}

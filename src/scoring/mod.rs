//! Scoring, calibration and online learning
//!
//! Candidates are described by a closed set of nine features, combined into a
//! 0-100 score by fixed linear weights plus a handful of hard rules, then
//! calibrated to a probability. An online logistic model learns from resolved
//! outcomes and its prediction is blended with the calibrated one.

mod engine;
mod learner;

pub use engine::ScoringEngine;
pub use learner::OnlineLogit;

use serde::Serialize;

pub const FEATURE_COUNT: usize = 9;

/// The nine signal features, all in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Higher-timeframe bias agrees with the candidate side
    pub htf_align: f64,
    /// Short-window ADX, normalized above the trend gate
    pub trend_strength: f64,
    /// Short-timeframe momentum check
    pub ltf_momentum: f64,
    /// Reward/risk to the first target, normalized
    pub reward_risk: f64,
    /// Band tightness advantage
    pub bandwidth_edge: f64,
    /// Retest or imbalance-gap confirmation present
    pub retest_or_gap: f64,
    /// Volatility inside the tradable sweet spot
    pub vol_sweet_spot: f64,
    /// Volume percentile within the scanned set
    pub volume_rank: f64,
    /// Armed after a recent tracked loss on the symbol
    pub recent_penalty: f64,
}

impl FeatureVector {
    /// Fixed feature order shared by the linear score and the learner.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.htf_align,
            self.trend_strength,
            self.ltf_momentum,
            self.reward_risk,
            self.bandwidth_edge,
            self.retest_or_gap,
            self.vol_sweet_spot,
            self.volume_rank,
            self.recent_penalty,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_is_stable() {
        let f = FeatureVector {
            htf_align: 1.0,
            trend_strength: 0.2,
            ltf_momentum: 0.3,
            reward_risk: 0.4,
            bandwidth_edge: 0.5,
            retest_or_gap: 0.6,
            vol_sweet_spot: 0.7,
            volume_rank: 0.8,
            recent_penalty: 0.9,
        };
        let a = f.as_array();
        assert_eq!(a[0], 1.0);
        assert_eq!(a[8], 0.9);
        assert_eq!(a.len(), FEATURE_COUNT);
    }
}

//! Scoring, calibration and learner behavior through the public API

use crate::common::{breakout_window, rising_window};
use trendscout::config::Config;
use trendscout::scoring::{FeatureVector, OnlineLogit, ScoringEngine};
use trendscout::strategy::{Candidate, Regime, Side};

fn aligned_features() -> FeatureVector {
    FeatureVector {
        htf_align: 1.0,
        trend_strength: 0.8,
        ltf_momentum: 1.0,
        reward_risk: 0.5,
        bandwidth_edge: 0.6,
        retest_or_gap: 1.0,
        vol_sweet_spot: 1.0,
        volume_rank: 0.9,
        recent_penalty: 0.0,
    }
}

fn candidate(ltf: &trendscout::data::PriceWindow) -> Candidate {
    let entry = ltf.last().unwrap().close;
    Candidate::new(
        "BTC-USDT",
        Side::Long,
        Regime::Trend,
        entry,
        entry - 1.2,
        [entry + 1.2, entry + 1.92, entry + 2.64],
        50.0,
        "test".to_string(),
        ltf,
    )
    .unwrap()
}

#[test]
fn test_evaluate_attaches_score_and_probabilities() {
    let engine = ScoringEngine::new(&Config::default());
    let ltf = breakout_window("BTC-USDT");
    let htf = rising_window("BTC-USDT", 80, 100.0, 0.5);

    let mut c = candidate(&ltf);
    engine.evaluate(&mut c, &ltf, &htf, 0.9, 0.0);

    assert!(c.features.is_some());
    assert!(c.score >= 0.0);
    assert!(c.probability > 0.0 && c.probability < 1.0);
    assert!(c.blended_probability > 0.0 && c.blended_probability < 1.0);
}

#[test]
fn test_disabled_learner_is_passthrough() {
    let mut config = Config::default();
    config.learner.enabled = false;
    let engine = ScoringEngine::new(&config);
    let ltf = breakout_window("BTC-USDT");
    let htf = rising_window("BTC-USDT", 80, 100.0, 0.5);

    let mut c = candidate(&ltf);
    engine.evaluate(&mut c, &ltf, &htf, 0.9, 0.0);
    assert_eq!(c.blended_probability, c.probability);

    // Outcomes are ignored without a learner
    engine.record_outcome(&aligned_features(), true);
    assert_eq!(engine.learner_samples(), 0);
}

#[test]
fn test_outcomes_shift_blended_probability() {
    let config = Config::default();
    let engine = ScoringEngine::new(&config);
    let ltf = breakout_window("BTC-USDT");
    let htf = rising_window("BTC-USDT", 80, 100.0, 0.5);

    let mut before = candidate(&ltf);
    engine.evaluate(&mut before, &ltf, &htf, 0.9, 0.0);
    let features = before.features.unwrap();

    for _ in 0..200 {
        engine.record_outcome(&features, true);
    }
    assert_eq!(engine.learner_samples(), 200);

    let mut after = candidate(&ltf);
    engine.evaluate(&mut after, &ltf, &htf, 0.9, 0.0);
    // Repeated wins on these features pull the blend upward
    assert!(after.blended_probability > before.blended_probability);
    // The calibrated half is untouched by learning
    assert_eq!(after.probability, before.probability);
}

#[test]
fn test_learner_is_deterministic() {
    let config = Config::default();
    let mut a = OnlineLogit::new(&config.learner);
    let mut b = OnlineLogit::new(&config.learner);
    let features = aligned_features();

    for i in 0..50 {
        let label = i % 3 == 0;
        a.update(&features, label);
        b.update(&features, label);
    }
    assert_eq!(a.predict(&features), b.predict(&features));
    assert_eq!(a.bias(), b.bias());
}

#[test]
fn test_recency_penalty_decays_per_read() {
    let config = Config::default();
    let engine = ScoringEngine::new(&config);

    engine.mark_loss("BTC-USDT");
    // penalty_decay = 2: armed for exactly two reads
    assert_eq!(engine.consume_penalty("BTC-USDT"), 1.0);
    assert_eq!(engine.consume_penalty("BTC-USDT"), 1.0);
    assert_eq!(engine.consume_penalty("BTC-USDT"), 0.0);
    // Other symbols are unaffected
    assert_eq!(engine.consume_penalty("ETH-USDT"), 0.0);
}

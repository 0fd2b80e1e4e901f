//! Adaptive acceptance threshold
//!
//! Two loops write the same dynamic value and are deliberately kept apart:
//! relaxation reacts to sweep yield (fast, small steps down), the auto-tuner
//! reacts to resolved outcomes (slow, its own cooldown, both directions).
//! Fusing them would couple trigger conditions that can legitimately disagree.

use crate::config::ThresholdConfig;
use chrono::{DateTime, Duration, Utc};

pub struct ThresholdController {
    cfg: ThresholdConfig,
    current: f64,
    empty_streak: u32,
    relaxed_by: f64,
    last_tune: Option<DateTime<Utc>>,
}

impl ThresholdController {
    pub fn new(cfg: &ThresholdConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            current: cfg.base_min_score,
            empty_streak: 0,
            relaxed_by: 0.0,
            last_tune: None,
        }
    }

    /// The dynamic minimum score.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// The lower bar used only when a sweep produced no strong candidate.
    pub fn fallback(&self) -> f64 {
        self.cfg.fallback_min_score
    }

    /// Relaxation loop, fed the strong-candidate count after every sweep.
    pub fn observe_sweep(&mut self, strong_count: usize) {
        if strong_count == 0 {
            self.empty_streak += 1;
            if self.empty_streak >= self.cfg.empty_limit && self.relaxed_by < self.cfg.relax_max {
                self.current = (self.current - self.cfg.relax_step).max(self.cfg.floor);
                self.relaxed_by += self.cfg.relax_step;
                self.empty_streak = 0;
                tracing::info!(min_score = self.current, "Relaxed acceptance threshold");
            }
        } else {
            self.empty_streak = 0;
            if self.relaxed_by > 0.0 || self.current < self.cfg.base_min_score {
                self.current = self.current.max(self.cfg.base_min_score);
                self.relaxed_by = 0.0;
                tracing::debug!(min_score = self.current, "Restored acceptance threshold");
            }
        }
    }

    /// Auto-tune loop, run once per sweep before evaluation. Adjusts at most
    /// once per cooldown window and only with enough resolved outcomes.
    pub fn auto_tune(&mut self, win_rate: Option<f64>, samples: usize, now: DateTime<Utc>) {
        if !self.cfg.tuner_enabled {
            return;
        }
        if let Some(last) = self.last_tune {
            if now - last < Duration::seconds(self.cfg.tune_cooldown_secs as i64) {
                return;
            }
        }
        if samples < self.cfg.min_samples {
            return;
        }
        let Some(rate) = win_rate else { return };

        if rate < self.cfg.target_win_rate - self.cfg.tune_band {
            self.current = (self.current + self.cfg.raise_step).min(self.cfg.ceil);
            tracing::info!(
                win_rate = rate,
                min_score = self.current,
                "AutoTune: below target, tightening"
            );
        } else if rate > self.cfg.target_win_rate + self.cfg.tune_band {
            self.current = (self.current - self.cfg.lower_step).max(self.cfg.floor);
            tracing::info!(
                win_rate = rate,
                min_score = self.current,
                "AutoTune: above target, loosening"
            );
        }
        self.last_tune = Some(now);
    }
}

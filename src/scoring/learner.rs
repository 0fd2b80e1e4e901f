//! Online logistic regression over the feature vector
//!
//! One weight per feature plus a bias, updated with plain SGD and L2 decay,
//! exactly once per resolved outcome. Fully deterministic: identical outcome
//! sequences produce bit-identical weights.

use super::{FeatureVector, FEATURE_COUNT};
use crate::config::LearnerConfig;

pub(crate) fn sigmoid(z: f64) -> f64 {
    // Clamp to avoid exp overflow on pathological inputs
    1.0 / (1.0 + (-z.clamp(-500.0, 500.0)).exp())
}

#[derive(Debug, Clone)]
pub struct OnlineLogit {
    bias: f64,
    weights: [f64; FEATURE_COUNT],
    learning_rate: f64,
    l2: f64,
    samples_seen: u64,
}

impl OnlineLogit {
    pub fn new(config: &LearnerConfig) -> Self {
        Self {
            bias: config.init_bias,
            weights: [0.0; FEATURE_COUNT],
            learning_rate: config.learning_rate,
            l2: config.l2,
            samples_seen: 0,
        }
    }

    /// Predicted success probability for a feature vector.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let z = self
            .weights
            .iter()
            .zip(features.as_array())
            .fold(self.bias, |acc, (w, f)| acc + w * f);
        sigmoid(z)
    }

    /// Single-sample gradient step towards the observed outcome. Order
    /// matters: the prediction uses the pre-update parameters.
    pub fn update(&mut self, features: &FeatureVector, won: bool) {
        let label = if won { 1.0 } else { 0.0 };
        let gradient = self.predict(features) - label;

        self.bias -= self.learning_rate * (gradient + self.l2 * self.bias);
        for (w, f) in self.weights.iter_mut().zip(features.as_array()) {
            *w -= self.learning_rate * (gradient * f + self.l2 * *w);
        }
        self.samples_seen += 1;
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

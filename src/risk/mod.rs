//! Stop/target ladder calculation
//!
//! One stop and three targets at fixed R-multiples of a volatility-scaled
//! risk unit. Pure; the only failure is a non-positive volatility estimate,
//! which the caller must treat as "discard the candidate".

use crate::config::RiskConfig;
use crate::strategy::Side;
use thiserror::Error;

/// Risk calculation errors
#[derive(Debug, Error)]
pub enum RiskError {
    /// Volatility estimate was zero, negative, or not finite
    #[error("invalid volatility estimate: {0}")]
    InvalidVolatility(f64),
}

/// A computed stop-loss/take-profit ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub stop: f64,
    /// Strictly monotonic away from entry in trade direction
    pub targets: [f64; 3],
}

impl Levels {
    /// Check the ordering invariant: LONG stop < entry < tp1 < tp2 < tp3,
    /// mirrored for SHORT.
    pub fn is_valid(&self, side: Side, entry: f64) -> bool {
        let [tp1, tp2, tp3] = self.targets;
        match side {
            Side::Long => self.stop < entry && entry < tp1 && tp1 < tp2 && tp2 < tp3,
            Side::Short => tp3 < tp2 && tp2 < tp1 && tp1 < entry && entry < self.stop,
        }
    }
}

/// Compute the ladder for a candidate entry.
///
/// risk = stop_mult x volatility; LONG stop = entry - risk and targets at
/// entry + R_i * risk for the configured ascending R-multiples, SHORT mirrored.
pub fn compute_levels(
    side: Side,
    entry: f64,
    volatility: f64,
    config: &RiskConfig,
) -> Result<Levels, RiskError> {
    if !(volatility > 0.0) || !volatility.is_finite() {
        return Err(RiskError::InvalidVolatility(volatility));
    }
    let risk = config.stop_mult * volatility;
    let levels = match side {
        Side::Long => Levels {
            stop: entry - risk,
            targets: [
                entry + config.tp_r[0] * risk,
                entry + config.tp_r[1] * risk,
                entry + config.tp_r[2] * risk,
            ],
        },
        Side::Short => Levels {
            stop: entry + risk,
            targets: [
                entry - config.tp_r[0] * risk,
                entry - config.tp_r[1] * risk,
                entry - config.tp_r[2] * risk,
            ],
        },
    };
    Ok(levels)
}

/// Reward/risk ratio to the first target.
pub fn reward_risk(side: Side, entry: f64, levels: &Levels) -> f64 {
    match side {
        Side::Long => (levels.targets[0] - entry) / (entry - levels.stop).max(1e-9),
        Side::Short => (entry - levels.targets[0]) / (levels.stop - entry).max(1e-9),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RiskConfig {
        RiskConfig {
            stop_mult: 1.2,
            tp_r: [1.0, 1.6, 2.2],
        }
    }

    #[test]
    fn test_long_ladder_ordering() {
        let levels = compute_levels(Side::Long, 100.0, 2.0, &config()).unwrap();
        assert!((levels.stop - 97.6).abs() < 1e-9);
        assert!((levels.targets[0] - 102.4).abs() < 1e-9);
        assert!((levels.targets[1] - 103.84).abs() < 1e-9);
        assert!((levels.targets[2] - 105.28).abs() < 1e-9);
        assert!(levels.is_valid(Side::Long, 100.0));
    }

    #[test]
    fn test_short_ladder_ordering() {
        let levels = compute_levels(Side::Short, 100.0, 2.0, &config()).unwrap();
        assert!((levels.stop - 102.4).abs() < 1e-9);
        assert!(levels.targets[0] < 100.0);
        assert!(levels.targets[1] < levels.targets[0]);
        assert!(levels.targets[2] < levels.targets[1]);
        assert!(levels.is_valid(Side::Short, 100.0));
    }

    #[test]
    fn test_zero_volatility_rejected() {
        assert!(matches!(
            compute_levels(Side::Long, 100.0, 0.0, &config()),
            Err(RiskError::InvalidVolatility(_))
        ));
    }

    #[test]
    fn test_negative_volatility_rejected() {
        assert!(compute_levels(Side::Short, 100.0, -1.0, &config()).is_err());
    }

    #[test]
    fn test_nan_volatility_rejected() {
        assert!(compute_levels(Side::Long, 100.0, f64::NAN, &config()).is_err());
    }

    #[test]
    fn test_reward_risk_is_first_r_multiple() {
        let cfg = config();
        let levels = compute_levels(Side::Long, 50.0, 1.0, &cfg).unwrap();
        let rr = reward_risk(Side::Long, 50.0, &levels);
        assert!((rr - cfg.tp_r[0]).abs() < 1e-9);

        let levels = compute_levels(Side::Short, 50.0, 1.0, &cfg).unwrap();
        let rr = reward_risk(Side::Short, 50.0, &levels);
        assert!((rr - cfg.tp_r[0]).abs() < 1e-9);
    }

    #[test]
    fn test_is_valid_detects_degenerate() {
        let levels = Levels {
            stop: 101.0,
            targets: [102.0, 103.0, 104.0],
        };
        assert!(!levels.is_valid(Side::Long, 100.0));
    }
}

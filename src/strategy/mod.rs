//! Strategy evaluators
//!
//! Four independent pattern detectors behind one capability seam: each
//! consumes the short and long windows for a symbol and produces at most one
//! directional candidate. Shared derivations (higher-timeframe bias, the
//! short-timeframe momentum check) are free functions; strategies depend only
//! on the indicator library and never on each other.

mod momentum;
mod range;
mod structure;
mod trend;

pub use momentum::MomentumStrategy;
pub use range::RangeStrategy;
pub use structure::StructureStrategy;
pub use trend::TrendStrategy;

use crate::data::PriceWindow;
use crate::indicators::{body_strength, ema};
use crate::scoring::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// Which evaluator produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Breakout/retest trend following
    Trend,
    /// Liquidity sweep + character change
    Structure,
    /// Band mean reversion
    Range,
    /// Confirmed channel breakout
    Momentum,
    /// Pre-breakout early trigger
    PreBreak,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Regime::Trend => "TREND",
            Regime::Structure => "STRUCT",
            Regime::Range => "RANGE",
            Regime::Momentum => "MOMO",
            Regime::PreBreak => "PREMO",
        };
        write!(f, "{tag}")
    }
}

/// Higher-timeframe directional lean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Long,
    Short,
    Neutral,
}

impl Bias {
    /// Bias agrees with the candidate side
    pub fn matches(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (Bias::Long, Side::Long) | (Bias::Short, Side::Short)
        )
    }

    /// Bias actively points the other way (neutral opposes nothing)
    pub fn opposes(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (Bias::Long, Side::Short) | (Bias::Short, Side::Long)
        )
    }
}

/// A proposed directional trade, produced by one evaluator and enriched by
/// the scoring engine before gating.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub symbol: String,
    pub side: Side,
    pub regime: Regime,
    pub entry: f64,
    pub stop: f64,
    /// Strictly monotonic away from entry in trade direction
    pub targets: [f64; 3],
    /// Raw evaluator score, replaced by the scoring engine
    pub score: f64,
    /// Calibrated probability (scoring engine)
    pub probability: f64,
    /// Calibrated probability blended with the online learner
    pub blended_probability: f64,
    /// Human-readable setup description
    pub reason: String,
    /// Retest or imbalance-gap confirmation present
    pub has_confirmation: bool,
    /// Additive bonus attached by the early-trigger evaluator
    pub early_bonus: f64,
    /// Attached by the scoring engine
    pub features: Option<FeatureVector>,
    /// Index of the evaluated bar in the short window
    pub bar_index: usize,
    /// Timestamp of the evaluated bar
    pub bar_timestamp: DateTime<Utc>,
}

impl Candidate {
    /// Create a candidate from an evaluator decision; scoring fields start at
    /// their neutral values and are filled in by the engine.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: &str,
        side: Side,
        regime: Regime,
        entry: f64,
        stop: f64,
        targets: [f64; 3],
        score: f64,
        reason: String,
        ltf: &PriceWindow,
    ) -> Option<Self> {
        let last = ltf.last()?;
        Some(Self {
            symbol: symbol.to_string(),
            side,
            regime,
            entry,
            stop,
            targets,
            score,
            probability: 0.5,
            blended_probability: 0.5,
            reason,
            has_confirmation: false,
            early_bonus: 0.0,
            features: None,
            bar_index: ltf.len() - 1,
            bar_timestamp: last.timestamp,
        })
    }
}

/// Capability seam implemented by the four evaluators
pub trait Strategy: Send + Sync {
    /// Which regime tag this evaluator stamps on its candidates
    fn regime(&self) -> Regime;

    /// Evaluate one symbol. Missing or insufficient data means abstain
    /// (`None`), never an error.
    fn analyze(&self, ltf: &PriceWindow, htf: &PriceWindow, symbol: &str) -> Option<Candidate>;
}

/// Higher-timeframe bias from the slope of a slow EMA over the long window:
/// rising means Long, falling means Short, flat or undefined means Neutral.
pub fn htf_bias(htf: &PriceWindow, period: usize) -> Bias {
    let closes = htf.closes();
    if closes.len() < 2 {
        return Bias::Neutral;
    }
    let line = ema(&closes, period);
    let last = line[line.len() - 1];
    let prev = line[line.len() - 2];
    if !last.is_finite() || !prev.is_finite() {
        return Bias::Neutral;
    }
    if last > prev {
        Bias::Long
    } else if last < prev {
        Bias::Short
    } else {
        Bias::Neutral
    }
}

/// Short-timeframe momentum check shared by the trend evaluator and the
/// scoring engine: fast EMA on the right side of the medium EMA, close
/// progressing in the trade direction, and a strong last candle body.
pub fn ltf_momentum_ok(ltf: &PriceWindow, side: Side) -> bool {
    if ltf.len() < 2 {
        return false;
    }
    let closes = ltf.closes();
    let ema9 = ema(&closes, 9);
    let ema21 = ema(&closes, 21);
    let (fast, medium) = (ema9[ema9.len() - 1], ema21[ema21.len() - 1]);

    let last = match ltf.last() {
        Some(b) => *b,
        None => return false,
    };
    let prev_close = closes[closes.len() - 2];
    let bs = body_strength(last.open, last.high, last.low, last.close);

    match side {
        Side::Long => fast > medium && last.close >= prev_close && bs >= 0.60,
        Side::Short => fast < medium && last.close <= prev_close && bs >= 0.60,
    }
}

/// Shared window-size gate; evaluators abstain below these counts.
pub(crate) fn windows_ok(
    ltf: &PriceWindow,
    htf: &PriceWindow,
    ltf_min: usize,
    htf_min: usize,
) -> bool {
    ltf.len() >= ltf_min && htf.len() >= htf_min
}

#[cfg(test)]
pub(crate) mod testbars {
    //! Synthetic window builders shared by the strategy tests.

    use crate::data::{Bar, PriceWindow};
    use chrono::{DateTime, Duration, Utc};

    pub fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Window of candles from (open, high, low, close, volume) tuples,
    /// 15 minutes apart.
    pub fn window_from(ohlcv: &[(f64, f64, f64, f64, f64)]) -> PriceWindow {
        let bars: Vec<Bar> = ohlcv
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close, volume))| Bar {
                open,
                high,
                low,
                close,
                volume,
                timestamp: base_time() + Duration::minutes(15 * i as i64),
            })
            .collect();
        PriceWindow::new("TEST-USDT", bars).unwrap()
    }

    /// Flat window with tiny noise-free candles around `price`.
    pub fn flat_window(len: usize, price: f64) -> PriceWindow {
        let candles: Vec<(f64, f64, f64, f64, f64)> = (0..len)
            .map(|_| (price, price + 0.1, price - 0.1, price, 100.0))
            .collect();
        window_from(&candles)
    }

    /// Steadily rising window: every candle closes higher than it opened,
    /// with wide directional bodies. Produces a Long bias and a high ADX.
    pub fn rising_window(len: usize, start: f64, step: f64) -> PriceWindow {
        let candles: Vec<(f64, f64, f64, f64, f64)> = (0..len)
            .map(|i| {
                let open = start + step * i as f64;
                let close = open + step;
                (open, close + step * 0.1, open - step * 0.1, close, 100.0)
            })
            .collect();
        window_from(&candles)
    }

    /// Steadily falling window, mirror of [`rising_window`].
    pub fn falling_window(len: usize, start: f64, step: f64) -> PriceWindow {
        let candles: Vec<(f64, f64, f64, f64, f64)> = (0..len)
            .map(|i| {
                let open = start - step * i as f64;
                let close = open - step;
                (open, open + step * 0.1, close - step * 0.1, close, 100.0)
            })
            .collect();
        window_from(&candles)
    }
}

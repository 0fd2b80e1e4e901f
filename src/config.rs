//! Configuration types for trendscout
//!
//! Every tunable lives in one tree. Defaults correspond to the `balanced`
//! mode; the other presets replace the whole snapshot via [`Config::with_mode`]
//! rather than patching individual values.

use clap::ValueEnum;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub structure: StructureConfig,
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub learner: LearnerConfig,
    #[serde(default)]
    pub threshold: ThresholdConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Named parameter preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Aggressive,
    #[default]
    Balanced,
    Conservative,
}

/// Sweep loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Seconds between sweeps
    pub interval_secs: u64,
    /// Bounded concurrency for per-symbol evaluation
    pub concurrency: usize,
    /// Maximum symbols evaluated per sweep
    pub scan_limit: usize,
    /// Maximum emissions per sweep
    pub top_n: usize,
    /// Per-symbol cooldown after an emitted signal
    pub cooldown_secs: u64,
    /// Minimum bars between an emission and an opposite-side re-signal
    pub opposite_min_bars: usize,
    /// Quote-volume floor for the scanned universe (USDT)
    pub min_quote_volume: f64,
    /// Sleep after a sweep-level failure
    pub fault_cooldown_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            concurrency: 8,
            scan_limit: 260,
            top_n: 2,
            cooldown_secs: 1800,
            opposite_min_bars: 2,
            min_quote_volume: 2_000_000.0,
            fault_cooldown_secs: 30,
        }
    }
}

/// Window fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Bars requested for the short (15m) window
    pub ltf_lookback: usize,
    /// Bars requested for the long (1h) window
    pub htf_lookback: usize,
    /// Minimum usable bars in the short window
    pub ltf_min_bars: usize,
    /// Minimum usable bars in the long window
    pub htf_min_bars: usize,
    /// Per-request timeout in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ltf_lookback: 320,
            htf_lookback: 180,
            ltf_min_bars: 80,
            htf_min_bars: 60,
            fetch_timeout_secs: 10,
        }
    }
}

/// Stop/target ladder configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// ATR multiple for the stop distance
    pub stop_mult: f64,
    /// Ascending R-multiples for the three targets
    pub tp_r: [f64; 3],
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_mult: 1.2,
            tp_r: [1.0, 1.6, 2.2],
        }
    }
}

/// Trend (breakout/retest) strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Minimum higher-timeframe ADX for a trending regime
    pub adx_trend_min: f64,
    /// Minimum body/range ratio for a displacement candle
    pub disp_body_min: f64,
    /// Higher-timeframe bars searched for a displacement candle
    pub disp_lookback: usize,
    /// Donchian channel window
    pub donchian_window: usize,
    /// Fractional buffer a close must clear past the channel
    pub break_buffer: f64,
    /// Retest touch tolerance in ATR multiples
    pub retest_tol_atr: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            adx_trend_min: 18.0,
            disp_body_min: 0.55,
            disp_lookback: 2,
            donchian_window: 20,
            break_buffer: 0.0008,
            retest_tol_atr: 0.25,
        }
    }
}

/// Structure (liquidity sweep / character change) strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Bars to the left of a fractal swing point
    pub swing_left: usize,
    /// Bars to the right of a fractal swing point
    pub swing_right: usize,
    /// Fractional tolerance for a liquidity sweep
    pub sweep_eps: f64,
    /// Fractional tolerance for the character-change break
    pub break_eps: f64,
    /// Bars searched backwards for an imbalance gap
    pub gap_lookback: usize,
    /// Retracement band of the impulse leg used when no gap exists
    pub retrace_low: f64,
    pub retrace_high: f64,
    /// Reject the setup when no imbalance gap is present
    pub require_gap: bool,
    /// Minimum impulse leg as a fraction of price
    pub min_leg_pct: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            swing_left: 2,
            swing_right: 2,
            sweep_eps: 0.0005,
            break_eps: 0.0005,
            gap_lookback: 20,
            retrace_low: 0.62,
            retrace_high: 0.79,
            require_gap: true,
            min_leg_pct: 0.004,
        }
    }
}

/// Range (mean reversion) strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Bollinger window
    pub bb_period: usize,
    /// Bollinger deviation multiplier
    pub bb_k: f64,
    /// Maximum bandwidth for a ranging market
    pub bandwidth_max: f64,
    /// Oscillator threshold for long setups
    pub rsi_long: f64,
    /// Oscillator threshold for short setups
    pub rsi_short: f64,
    /// Minimum body/range ratio for the re-entry candle
    pub body_min: f64,
    /// Volume multiple over its 20-bar average
    pub vol_mult: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            bb_period: 20,
            bb_k: 2.0,
            bandwidth_max: 0.055,
            rsi_long: 36.0,
            rsi_short: 64.0,
            body_min: 0.62,
            vol_mult: 1.40,
        }
    }
}

/// Momentum confirmation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmMode {
    /// Always passes
    Off,
    /// All three candles in the same direction, first two sufficiently strong
    Strict3,
    /// At least two of the last three candles in the same direction
    TwoOfThree,
    /// Net signed body strength beyond a threshold
    NetBody,
    /// Above/below the medium moving average with above-average volume
    EmaVolume,
    /// TwoOfThree OR EmaVolume
    #[default]
    Hybrid,
}

/// Momentum / early-trigger strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Active confirmation rule
    pub confirm_mode: ConfirmMode,
    /// Body/range floor for confirmation candles
    pub body_min: f64,
    /// Relative volume threshold over the 20-bar average
    pub rel_vol: f64,
    /// Net signed body threshold for [`ConfirmMode::NetBody`]
    pub net_body_threshold: f64,
    /// Reject when ATR/price exceeds this cap
    pub max_atr_pct: f64,
    /// Reject when price is further than this many ATRs from EMA21
    pub max_ema_dist_atr: f64,
    /// Enable the pre-break early trigger
    pub early_enabled: bool,
    /// Channel-edge proximity for the early trigger, in ATR multiples
    pub prebreak_atr: f64,
    /// Relaxed body floor in early mode
    pub early_body_min: f64,
    /// Relaxed relative volume threshold in early mode
    pub early_rel_vol: f64,
    /// Score bonus when the higher timeframe trends in the signal direction
    pub early_adx_bonus: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            confirm_mode: ConfirmMode::Hybrid,
            body_min: 0.50,
            rel_vol: 1.35,
            net_body_threshold: 0.80,
            max_atr_pct: 0.05,
            max_ema_dist_atr: 1.8,
            early_enabled: true,
            prebreak_atr: 0.25,
            early_body_min: 0.45,
            early_rel_vol: 1.20,
            early_adx_bonus: 2.0,
        }
    }
}

/// Linear feature weights, on the 0-100 score scale
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub htf_align: f64,
    pub trend_strength: f64,
    pub ltf_momentum: f64,
    pub reward_risk: f64,
    pub bandwidth_edge: f64,
    pub retest_or_gap: f64,
    pub vol_sweet_spot: f64,
    pub volume_rank: f64,
    pub recent_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            htf_align: 18.0,
            trend_strength: 14.0,
            ltf_momentum: 10.0,
            // Reward/risk disabled on the base preset: stops are ATR-derived,
            // so RR1 is nearly constant and carries no ranking information.
            reward_risk: 0.0,
            bandwidth_edge: 5.0,
            retest_or_gap: 8.0,
            vol_sweet_spot: 3.0,
            volume_rank: 8.0,
            recent_penalty: -3.0,
        }
    }
}

/// Scoring and calibration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Base score before feature contributions
    pub base: f64,
    #[serde(default)]
    pub weights: ScoreWeights,
    /// Logistic calibration slope
    pub calib_slope: f64,
    /// Logistic calibration intercept
    pub calib_intercept: f64,
    /// Lower bound of the volatility sweet spot (ATR/price)
    pub sweet_atr_min: f64,
    /// Upper bound of the volatility sweet spot (ATR/price)
    pub sweet_atr_max: f64,
    /// Sweeps a recency penalty stays armed after a tracked loss
    pub penalty_decay: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 20.0,
            weights: ScoreWeights::default(),
            calib_slope: 0.10,
            calib_intercept: -7.0,
            sweet_atr_min: 0.0010,
            sweet_atr_max: 0.028,
            penalty_decay: 2,
        }
    }
}

/// Online learner configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub enabled: bool,
    pub learning_rate: f64,
    pub l2: f64,
    pub init_bias: f64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            learning_rate: 0.02,
            l2: 1e-4,
            init_bias: -2.0,
        }
    }
}

/// Adaptive acceptance-threshold configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Baseline minimum score for a strong candidate
    pub base_min_score: f64,
    /// Lower floor used only when a sweep has no strong candidate
    pub fallback_min_score: f64,
    /// Hard floor for the dynamic threshold
    pub floor: f64,
    /// Hard ceiling for the dynamic threshold
    pub ceil: f64,
    /// Empty sweeps before one relaxation step
    pub empty_limit: u32,
    /// Relaxation step size
    pub relax_step: f64,
    /// Cumulative relaxation cap
    pub relax_max: f64,
    /// Enable the outcome-driven auto-tuner
    pub tuner_enabled: bool,
    /// Target recent win rate
    pub target_win_rate: f64,
    /// Dead band around the target before the tuner reacts
    pub tune_band: f64,
    /// Minimum resolved outcomes before tuning
    pub min_samples: usize,
    /// Rolling outcome window length
    pub outcome_window: usize,
    /// Seconds between auto-tune adjustments
    pub tune_cooldown_secs: u64,
    /// Step when tightening (win rate below target)
    pub raise_step: f64,
    /// Step when loosening (win rate above target)
    pub lower_step: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base_min_score: 68.0,
            fallback_min_score: 62.0,
            floor: 58.0,
            ceil: 78.0,
            empty_limit: 3,
            relax_step: 2.0,
            relax_max: 6.0,
            tuner_enabled: true,
            target_win_rate: 0.52,
            tune_band: 0.05,
            min_samples: 20,
            outcome_window: 80,
            tune_cooldown_secs: 900,
            raise_step: 2.0,
            lower_step: 1.0,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub metrics_port: u16,
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: 9090,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Replace the tunable snapshot with a named preset.
    ///
    /// Presets shift the whole risk posture at once; partial in-place edits of
    /// single values are deliberately not supported.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        match mode {
            Mode::Aggressive => {
                self.scan.min_quote_volume = 700_000.0;
                self.scan.top_n = 5;
                self.scan.cooldown_secs = 900;
                self.scan.interval_secs = 180;
                self.threshold.base_min_score = 52.0;
                self.threshold.fallback_min_score = 55.0;
                self.trend.adx_trend_min = 14.0;
                self.trend.disp_body_min = 0.45;
                self.trend.break_buffer = 0.0006;
                self.trend.retest_tol_atr = 0.50;
                self.range.bandwidth_max = 0.080;
                self.structure.require_gap = false;
                self.scoring.sweet_atr_min = 0.0007;
                self.scoring.sweet_atr_max = 0.030;
                self.risk.stop_mult = 1.0;
            }
            Mode::Balanced => {}
            Mode::Conservative => {
                self.scan.min_quote_volume = 3_000_000.0;
                self.scan.cooldown_secs = 2400;
                self.threshold.base_min_score = 72.0;
                self.threshold.fallback_min_score = 65.0;
                self.trend.adx_trend_min = 20.0;
                self.trend.disp_body_min = 0.60;
                self.trend.break_buffer = 0.0012;
                self.trend.retest_tol_atr = 0.20;
                self.range.bandwidth_max = 0.045;
                self.scoring.sweet_atr_min = 0.0012;
                self.scoring.sweet_atr_max = 0.020;
                self.risk.stop_mult = 1.5;
            }
        }
        self
    }
}

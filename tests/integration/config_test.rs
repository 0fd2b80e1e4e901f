//! Configuration loading and preset tests

use trendscout::config::{Config, Mode};

#[test]
fn test_full_config_parses() {
    let toml = r#"
        [scan]
        interval_secs = 300
        concurrency = 8
        scan_limit = 260
        top_n = 2
        cooldown_secs = 1800
        opposite_min_bars = 2
        min_quote_volume = 2000000.0
        fault_cooldown_secs = 30

        [data]
        ltf_lookback = 320
        htf_lookback = 180
        ltf_min_bars = 80
        htf_min_bars = 60
        fetch_timeout_secs = 10

        [risk]
        stop_mult = 1.2
        tp_r = [1.0, 1.6, 2.2]

        [scoring]
        base = 20.0
        calib_slope = 0.10
        calib_intercept = -7.0
        sweet_atr_min = 0.0010
        sweet_atr_max = 0.028
        penalty_decay = 2

        [learner]
        enabled = true
        learning_rate = 0.02

        [threshold]
        base_min_score = 68.0
        fallback_min_score = 62.0
        floor = 58.0
        ceil = 78.0

        [telemetry]
        metrics_port = 9090
        log_level = "info"
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.scan.scan_limit, 260);
    assert_eq!(config.risk.tp_r, [1.0, 1.6, 2.2]);
    assert_eq!(config.threshold.base_min_score, 68.0);
    assert_eq!(config.telemetry.metrics_port, 9090);
}

#[test]
fn test_partial_config_fills_defaults() {
    let config: Config = toml::from_str("[scan]\ntop_n = 5\n").unwrap();
    assert_eq!(config.scan.top_n, 5);
    // Untouched sections carry their defaults
    assert_eq!(config.scan.interval_secs, 300);
    assert_eq!(config.threshold.fallback_min_score, 62.0);
    assert!(config.learner.enabled);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[scan]\nscan_limit = 40\n\n[telemetry]\nlog_level = \"debug\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.scan.scan_limit, 40);
    assert_eq!(config.telemetry.log_level, "debug");
}

#[test]
fn test_mode_presets_differ() {
    let balanced = Config::default().with_mode(Mode::Balanced);
    let aggressive = Config::default().with_mode(Mode::Aggressive);
    let conservative = Config::default().with_mode(Mode::Conservative);

    assert!(aggressive.scan.min_quote_volume < balanced.scan.min_quote_volume);
    assert!(aggressive.scan.top_n > balanced.scan.top_n);
    assert!(conservative.scan.min_quote_volume > balanced.scan.min_quote_volume);
    assert!(conservative.scan.cooldown_secs > aggressive.scan.cooldown_secs);
}

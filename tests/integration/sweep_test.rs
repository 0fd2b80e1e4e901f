//! End-to-end sweep behavior against a canned market

use crate::common::{breakout_window, flat_window, rising_window, CollectSink, StaticMarket};
use std::sync::Arc;
use trendscout::config::Config;
use trendscout::delivery::MemoryOutcomeFeed;
use trendscout::scanner::Scanner;
use trendscout::strategy::Side;

fn scanner(market: StaticMarket, sink: Arc<CollectSink>, feed: Arc<MemoryOutcomeFeed>) -> Scanner {
    Scanner::new(Config::default(), Arc::new(market), sink, feed)
}

#[tokio::test]
async fn test_breakout_produces_long_trend_signal() {
    let market = StaticMarket::new(vec![(
        "BTC-USDT",
        breakout_window("BTC-USDT"),
        rising_window("BTC-USDT", 80, 100.0, 0.5),
    )]);
    let sink = Arc::new(CollectSink::new());
    let feed = Arc::new(MemoryOutcomeFeed::new());
    let mut scanner = scanner(market, sink.clone(), feed.clone());

    let report = scanner.sweep().await.unwrap();
    assert_eq!(report.emitted, 1);

    let delivered = sink.delivered.lock().unwrap();
    let signal = &delivered[0];
    assert_eq!(signal.side, Side::Long);
    assert_eq!(signal.regime.to_string(), "TREND");
    assert!(signal.stop < signal.entry);
    assert!(signal.entry < signal.targets[0]);
    assert!(signal.targets[0] < signal.targets[1] && signal.targets[1] < signal.targets[2]);
    assert_eq!(feed.outstanding_len(), 1);
}

#[tokio::test]
async fn test_quiet_market_emits_nothing() {
    let market = StaticMarket::new(vec![
        (
            "BTC-USDT",
            flat_window("BTC-USDT", 120, 100.0),
            flat_window("BTC-USDT", 80, 100.0),
        ),
        (
            "ETH-USDT",
            flat_window("ETH-USDT", 120, 50.0),
            flat_window("ETH-USDT", 80, 50.0),
        ),
    ]);
    let sink = Arc::new(CollectSink::new());
    let feed = Arc::new(MemoryOutcomeFeed::new());
    let mut scanner = scanner(market, sink.clone(), feed);

    let report = scanner.sweep().await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.emitted, 0);
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_cooldown_suppresses_repeat_signal() {
    let market = StaticMarket::new(vec![(
        "BTC-USDT",
        breakout_window("BTC-USDT"),
        rising_window("BTC-USDT", 80, 100.0, 0.5),
    )]);
    let sink = Arc::new(CollectSink::new());
    let feed = Arc::new(MemoryOutcomeFeed::new());
    let mut scanner = scanner(market, sink.clone(), feed);

    assert_eq!(scanner.sweep().await.unwrap().emitted, 1);
    assert_eq!(scanner.sweep().await.unwrap().emitted, 0);
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn test_failed_delivery_leaves_symbol_eligible() {
    let market = StaticMarket::new(vec![(
        "BTC-USDT",
        breakout_window("BTC-USDT"),
        rising_window("BTC-USDT", 80, 100.0, 0.5),
    )]);
    let sink = Arc::new(CollectSink::new());
    let feed = Arc::new(MemoryOutcomeFeed::new());
    let mut scanner = scanner(market, sink.clone(), feed.clone());

    sink.set_fail(true);
    let report = scanner.sweep().await.unwrap();
    assert_eq!(report.emitted, 0);
    assert_eq!(feed.outstanding_len(), 0);

    // No state was committed, so the same setup emits once delivery recovers
    sink.set_fail(false);
    assert_eq!(scanner.sweep().await.unwrap().emitted, 1);
    assert_eq!(feed.outstanding_len(), 1);
}

#[tokio::test]
async fn test_top_n_caps_emissions() {
    let mut config = Config::default();
    config.scan.top_n = 1;
    let market = StaticMarket::new(vec![
        (
            "BTC-USDT",
            breakout_window("BTC-USDT"),
            rising_window("BTC-USDT", 80, 100.0, 0.5),
        ),
        (
            "ETH-USDT",
            breakout_window("ETH-USDT"),
            rising_window("ETH-USDT", 80, 100.0, 0.5),
        ),
    ]);
    let sink = Arc::new(CollectSink::new());
    let feed = Arc::new(MemoryOutcomeFeed::new());
    let mut scanner = Scanner::new(config, Arc::new(market), sink.clone(), feed);

    let report = scanner.sweep().await.unwrap();
    assert_eq!(report.candidates, 2);
    assert_eq!(report.emitted, 1);
}

#[tokio::test]
async fn test_loss_feedback_reaches_learner() {
    let market = StaticMarket::new(vec![(
        "BTC-USDT",
        breakout_window("BTC-USDT"),
        rising_window("BTC-USDT", 80, 100.0, 0.5),
    )]);
    let sink = Arc::new(CollectSink::new());
    let feed = Arc::new(MemoryOutcomeFeed::new());
    let mut scanner = scanner(market, sink, feed.clone());

    scanner.sweep().await.unwrap();
    feed.settle("BTC-USDT", false);

    let report = scanner.sweep().await.unwrap();
    assert_eq!(report.outcomes_absorbed, 1);
}

//! trendscout: adaptive multi-strategy signal scanner for KuCoin spot pairs
//!
//! This library provides the core components for:
//! - OHLCV windows and market data access (KuCoin REST)
//! - Pure technical indicator math
//! - Four pattern-detection strategies (trend, structure, range, momentum)
//! - Feature-based scoring with logistic calibration and an online learner
//! - ATR-derived stop/target ladders
//! - A bounded-concurrency scan orchestrator with adaptive thresholds
//! - Signal delivery and outcome-feedback seams
//! - Full observability stack

pub mod cli;
pub mod config;
pub mod data;
pub mod delivery;
pub mod indicators;
pub mod risk;
pub mod scanner;
pub mod scoring;
pub mod strategy;
pub mod telemetry;

//! Signal delivery and outcome feedback seams
//!
//! Emission goes through [`DeliverySink`]; a failed delivery means the signal
//! never happened as far as scanner state is concerned. Resolved outcomes come
//! back through [`OutcomeFeed`] and drive the learner and the auto-tuner.

use crate::scoring::FeatureVector;
use crate::strategy::{Candidate, Regime, Side};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

/// An emitted trade signal.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub id: Uuid,
    pub emitted_at: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub regime: Regime,
    pub entry: f64,
    pub stop: f64,
    pub targets: [f64; 3],
    pub score: f64,
    pub probability: f64,
    pub blended_probability: f64,
    pub reason: String,
    /// Carried for the learner update when the outcome resolves
    pub features: FeatureVector,
}

impl Signal {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            id: Uuid::new_v4(),
            emitted_at: Utc::now(),
            symbol: candidate.symbol.clone(),
            side: candidate.side,
            regime: candidate.regime,
            entry: candidate.entry,
            stop: candidate.stop,
            targets: candidate.targets,
            score: candidate.score,
            probability: candidate.probability,
            blended_probability: candidate.blended_probability,
            reason: candidate.reason.clone(),
            features: candidate.features.unwrap_or_default(),
        }
    }
}

/// A settled signal outcome.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub symbol: String,
    pub features: FeatureVector,
    pub won: bool,
}

/// Outbound signal channel.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, signal: &Signal) -> anyhow::Result<()>;
}

/// Source of resolved outcomes for emitted signals.
#[async_trait]
pub trait OutcomeFeed: Send + Sync {
    /// Register an emitted signal for later resolution.
    async fn record(&self, signal: &Signal) -> anyhow::Result<()>;

    /// Drain outcomes settled since the last call.
    async fn resolve_outstanding(&self) -> anyhow::Result<Vec<Outcome>>;
}

/// Sink that writes signals to the structured log.
#[derive(Default)]
pub struct LogSink;

#[async_trait]
impl DeliverySink for LogSink {
    async fn deliver(&self, signal: &Signal) -> anyhow::Result<()> {
        let payload = serde_json::to_string(signal)?;
        tracing::info!(
            symbol = %signal.symbol,
            side = %signal.side,
            regime = %signal.regime,
            score = signal.score,
            probability = signal.blended_probability,
            %payload,
            "Signal emitted"
        );
        Ok(())
    }
}

/// In-memory outcome feed for tests and demos: outcomes are settled manually
/// with [`MemoryOutcomeFeed::settle`].
#[derive(Default)]
pub struct MemoryOutcomeFeed {
    outstanding: Mutex<Vec<Signal>>,
    settled: Mutex<Vec<Outcome>>,
}

impl MemoryOutcomeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle the oldest outstanding signal for `symbol`.
    pub fn settle(&self, symbol: &str, won: bool) {
        let mut outstanding = self.outstanding.lock().expect("feed lock");
        if let Some(pos) = outstanding.iter().position(|s| s.symbol == symbol) {
            let signal = outstanding.remove(pos);
            self.settled.lock().expect("feed lock").push(Outcome {
                symbol: signal.symbol,
                features: signal.features,
                won,
            });
        }
    }

    pub fn outstanding_len(&self) -> usize {
        self.outstanding.lock().expect("feed lock").len()
    }
}

#[async_trait]
impl OutcomeFeed for MemoryOutcomeFeed {
    async fn record(&self, signal: &Signal) -> anyhow::Result<()> {
        self.outstanding
            .lock()
            .expect("feed lock")
            .push(signal.clone());
        Ok(())
    }

    async fn resolve_outstanding(&self) -> anyhow::Result<Vec<Outcome>> {
        Ok(std::mem::take(&mut *self.settled.lock().expect("feed lock")))
    }
}

//! Sweep orchestration
//!
//! One coordinating task drives the sweep state machine: absorb outcomes,
//! fetch the universe, fan out bounded-concurrency per-symbol evaluation over
//! an immutable state snapshot, rank, gate, emit, adapt. All state writes
//! happen after fan-in; a sweep-level fault is logged and retried after a
//! short cooldown, never fatal.

mod state;
mod threshold;

pub use state::{OutcomeHistory, StateStore, SymbolState};
pub use threshold::ThresholdController;

use crate::config::Config;
use crate::data::{volume_percentiles, MarketData, PriceWindow, Timeframe};
use crate::delivery::{DeliverySink, OutcomeFeed, Signal};
use crate::scoring::ScoringEngine;
use crate::strategy::{
    Candidate, MomentumStrategy, RangeStrategy, Strategy, StructureStrategy, TrendStrategy,
};
use crate::telemetry::{bump_counter, set_gauge, CounterMetric, GaugeMetric};
use chrono::{Duration as ChronoDuration, Utc};
use futures_util::future::join_all;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Summary of one completed sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub scanned: usize,
    pub candidates: usize,
    pub strong: usize,
    pub emitted: usize,
    pub outcomes_absorbed: usize,
}

pub struct Scanner {
    config: Config,
    market: Arc<dyn MarketData>,
    sink: Arc<dyn DeliverySink>,
    feed: Arc<dyn OutcomeFeed>,
    scoring: ScoringEngine,
    /// Registration order is the tie order: with equal scores the earlier
    /// evaluator wins (strict greater-than comparison).
    strategies: Vec<Box<dyn Strategy>>,
    states: StateStore,
    threshold: ThresholdController,
    history: OutcomeHistory,
}

impl Scanner {
    pub fn new(
        config: Config,
        market: Arc<dyn MarketData>,
        sink: Arc<dyn DeliverySink>,
        feed: Arc<dyn OutcomeFeed>,
    ) -> Self {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(TrendStrategy::new(&config)),
            Box::new(StructureStrategy::new(&config)),
            Box::new(RangeStrategy::new(&config)),
            Box::new(MomentumStrategy::new(&config)),
        ];
        Self {
            scoring: ScoringEngine::new(&config),
            threshold: ThresholdController::new(&config.threshold),
            history: OutcomeHistory::new(config.threshold.outcome_window),
            strategies,
            states: StateStore::new(),
            market,
            sink,
            feed,
            config,
        }
    }

    /// Run sweeps forever. Faults are logged and followed by a short pause.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            interval_secs = self.config.scan.interval_secs,
            concurrency = self.config.scan.concurrency,
            "Scanner started"
        );
        loop {
            match self.sweep().await {
                Ok(report) => {
                    tracing::info!(
                        scanned = report.scanned,
                        candidates = report.candidates,
                        strong = report.strong,
                        emitted = report.emitted,
                        min_score = self.threshold.current(),
                        "Sweep complete"
                    );
                    tokio::time::sleep(Duration::from_secs(self.config.scan.interval_secs)).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Sweep failed");
                    tokio::time::sleep(Duration::from_secs(self.config.scan.fault_cooldown_secs))
                        .await;
                }
            }
        }
    }

    /// One pass of the sweep state machine.
    pub async fn sweep(&mut self) -> anyhow::Result<SweepReport> {
        let mut report = SweepReport::default();

        // Absorb resolved outcomes before anything else: they feed the
        // learner, the recency penalty and the auto-tuner.
        let outcomes = self.feed.resolve_outstanding().await?;
        report.outcomes_absorbed = outcomes.len();
        for outcome in &outcomes {
            self.scoring.record_outcome(&outcome.features, outcome.won);
            self.history.push(outcome.won);
            if !outcome.won {
                self.scoring.mark_loss(&outcome.symbol);
            }
            bump_counter(CounterMetric::OutcomesResolved);
        }
        self.threshold
            .auto_tune(self.history.win_rate(), self.history.len(), Utc::now());

        // Universe selection
        let mut symbols = self
            .market
            .list_symbols(self.config.scan.min_quote_volume)
            .await?;
        if symbols.is_empty() {
            // A listing failure is a data problem, not a quiet market: it must
            // neither advance nor reset the relaxation streak.
            tracing::warn!("Universe is empty, nothing to scan");
            return Ok(report);
        }
        symbols.shuffle(&mut rand::thread_rng());
        symbols.truncate(self.config.scan.scan_limit);
        report.scanned = symbols.len();
        set_gauge(GaugeMetric::UniverseSize, symbols.len() as f64);

        let volume_ranks = match self.market.current_volumes().await {
            Ok(volumes) => volume_percentiles(&symbols, &volumes),
            Err(e) => {
                tracing::warn!(error = %e, "Volume snapshot failed, using neutral ranks");
                HashMap::new()
            }
        };

        // Fan-out over an immutable snapshot; per-symbol tasks never touch
        // live scanner state.
        let snapshot = self.states.snapshot();
        let semaphore = Semaphore::new(self.config.scan.concurrency.max(1));
        let this: &Scanner = &*self;
        let futures = symbols.iter().map(|symbol| {
            let state = snapshot.get(symbol).copied();
            let rank = volume_ranks.get(symbol).copied().unwrap_or(0.5);
            this.evaluate_symbol(symbol, state, rank, &semaphore)
        });
        let mut candidates: Vec<Candidate> = join_all(futures).await.into_iter().flatten().collect();
        report.candidates = candidates.len();

        Self::rank(&mut candidates);

        let min_score = self.threshold.current();
        let strong = candidates.iter().filter(|c| c.score >= min_score).count();
        report.strong = strong;

        for candidate in &candidates {
            if report.emitted >= self.config.scan.top_n {
                break;
            }
            let accept = candidate.score >= min_score
                || (strong == 0 && candidate.score >= self.threshold.fallback());
            if !accept {
                continue;
            }
            if self.emit(candidate).await {
                report.emitted += 1;
            }
        }

        self.threshold.observe_sweep(strong);
        set_gauge(GaugeMetric::DynamicMinScore, self.threshold.current());
        set_gauge(
            GaugeMetric::LearnerSamples,
            self.scoring.learner_samples() as f64,
        );
        bump_counter(CounterMetric::SweepsCompleted);
        Ok(report)
    }

    /// Stable descending sort: equal scores keep scan order.
    fn rank(candidates: &mut [Candidate]) {
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Deliver one accepted candidate. State is committed only when the sink
    /// accepts the signal; a delivery fault drops it for this sweep.
    async fn emit(&mut self, candidate: &Candidate) -> bool {
        let signal = Signal::from_candidate(candidate);
        tracing::info!(
            symbol = %signal.symbol,
            side = %signal.side,
            regime = %signal.regime,
            entry = signal.entry,
            stop = signal.stop,
            tp1 = signal.targets[0],
            tp2 = signal.targets[1],
            tp3 = signal.targets[2],
            score = signal.score,
            reason = %signal.reason,
            "Emitting signal"
        );

        match self.sink.deliver(&signal).await {
            Ok(()) => {
                if let Err(e) = self.feed.record(&signal).await {
                    tracing::warn!(error = %e, symbol = %signal.symbol, "Outcome feed rejected signal");
                }
                self.states.commit(
                    &candidate.symbol,
                    SymbolState {
                        last_signal_at: Utc::now(),
                        side: candidate.side,
                        bar_index: candidate.bar_index,
                        bar_timestamp: candidate.bar_timestamp,
                    },
                );
                bump_counter(CounterMetric::SignalsEmitted);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, symbol = %signal.symbol, "Delivery failed, dropping signal");
                bump_counter(CounterMetric::DeliveryFailures);
                false
            }
        }
    }

    /// Per-symbol evaluation task. Reads only its snapshot arguments; every
    /// failure mode is an abstention.
    async fn evaluate_symbol(
        &self,
        symbol: &str,
        state: Option<SymbolState>,
        volume_rank: f64,
        semaphore: &Semaphore,
    ) -> Option<Candidate> {
        let _permit = semaphore.acquire().await.ok()?;

        // Cooldown gate
        if let Some(state) = state {
            let cooldown = ChronoDuration::seconds(self.config.scan.cooldown_secs as i64);
            if Utc::now() - state.last_signal_at < cooldown {
                tracing::trace!(symbol, "Skipped: cooldown");
                return None;
            }
        }

        let (ltf, htf) = self.fetch_windows(symbol).await?;

        // Duplicate-bar guard: nothing new to evaluate since the last emission
        let last_ts = ltf.last()?.timestamp;
        if state.is_some_and(|s| s.bar_timestamp == last_ts) {
            tracing::trace!(symbol, "Skipped: same bar");
            return None;
        }

        let penalty = self.scoring.consume_penalty(symbol);
        let mut best: Option<Candidate> = None;
        for strategy in &self.strategies {
            if let Some(mut candidate) = strategy.analyze(&ltf, &htf, symbol) {
                self.scoring
                    .evaluate(&mut candidate, &ltf, &htf, volume_rank, penalty);
                if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                    best = Some(candidate);
                }
            }
        }
        let candidate = best?;

        // Anti-flip-flop: never repeat the recorded side; the opposite side
        // must wait out the configured bar distance.
        if let Some(state) = state {
            if candidate.side == state.side {
                tracing::trace!(symbol, "Skipped: same side as last signal");
                return None;
            }
            let bars_since = candidate.bar_index.saturating_sub(state.bar_index);
            if bars_since < self.config.scan.opposite_min_bars {
                tracing::trace!(symbol, "Skipped: opposite side too soon");
                return None;
            }
        }
        Some(candidate)
    }

    async fn fetch_windows(&self, symbol: &str) -> Option<(PriceWindow, PriceWindow)> {
        let data = &self.config.data;
        let ltf = self
            .market
            .fetch_bars(symbol, Timeframe::Min15, data.ltf_lookback)
            .await
            .ok()?;
        let htf = self
            .market
            .fetch_bars(symbol, Timeframe::Hour1, data.htf_lookback)
            .await
            .ok()?;
        if ltf.len() < data.ltf_min_bars || htf.len() < data.htf_min_bars {
            tracing::trace!(symbol, "Skipped: short history");
            return None;
        }
        Some((ltf, htf))
    }
}

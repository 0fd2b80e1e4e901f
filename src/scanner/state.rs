//! Per-symbol emission state and the rolling outcome history
//!
//! Both structures are owned by the orchestrator and mutated only in the
//! single-threaded phases of a sweep; the concurrent fan-out sees an immutable
//! snapshot taken beforehand.

use crate::strategy::Side;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// What the scanner remembers about the last emitted signal for a symbol.
#[derive(Debug, Clone, Copy)]
pub struct SymbolState {
    pub last_signal_at: DateTime<Utc>,
    pub side: Side,
    /// Index of the evaluated bar in the short window at emission time
    pub bar_index: usize,
    /// Timestamp of that bar, for the duplicate-bar guard
    pub bar_timestamp: DateTime<Utc>,
}

#[derive(Default)]
pub struct StateStore {
    states: HashMap<String, SymbolState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolState> {
        self.states.get(symbol)
    }

    /// Record an emission. Called only after successful delivery.
    pub fn commit(&mut self, symbol: &str, state: SymbolState) {
        self.states.insert(symbol.to_string(), state);
    }

    /// Copy taken before fan-out; per-symbol tasks gate on this, never on the
    /// live store.
    pub fn snapshot(&self) -> HashMap<String, SymbolState> {
        self.states.clone()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Rolling window of resolved outcomes driving the auto-tuner.
pub struct OutcomeHistory {
    window: usize,
    results: VecDeque<bool>,
}

impl OutcomeHistory {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            results: VecDeque::new(),
        }
    }

    pub fn push(&mut self, won: bool) {
        if self.results.len() == self.window {
            self.results.pop_front();
        }
        self.results.push_back(won);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Win rate over the window; `None` until at least one outcome resolved.
    pub fn win_rate(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let wins = self.results.iter().filter(|w| **w).count();
        Some(wins as f64 / self.results.len() as f64)
    }
}

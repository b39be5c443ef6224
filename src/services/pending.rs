//! Pending-operation ledger for duplicate suppression.
//!
//! DESIGN
//! ======
//! Each operation key records the instant it was first seen. A key counts as
//! pending until the debounce window has elapsed, after which it is pruned on
//! the next access. Lazy pruning stands in for a timer that clears the key,
//! which is all the single-threaded event model needs: the window only has to
//! span duplicate event delivery, not concurrent execution.
//!
//! TRADE-OFFS
//! ==========
//! This is best effort. A duplicate that arrives after the window closes is
//! applied like any other call.

#[cfg(test)]
#[path = "pending_test.rs"]
mod tests;

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Deterministic key for an add: `add-{component}-{canvas}`.
#[must_use]
pub fn add_key(component_id: &str, canvas_id: &str) -> String {
    format!("add-{component_id}-{canvas_id}")
}

/// Deterministic key for a move: `move-{component}-{source}-{target}`.
#[must_use]
pub fn move_key(component_id: &str, source_canvas_id: &str, target_canvas_id: &str) -> String {
    format!("move-{component_id}-{source_canvas_id}-{target_canvas_id}")
}

/// Time-boxed set of in-flight operation keys.
#[derive(Debug, Clone)]
pub struct PendingOperations {
    started: HashMap<String, Instant>,
    window: Duration,
}

impl PendingOperations {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { started: HashMap::new(), window }
    }

    /// Debounce window applied to every key.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to claim `key` at `now`. Returns `false` if it is already pending.
    pub fn try_begin_at(&mut self, key: &str, now: Instant) -> bool {
        self.prune(now);
        if self.started.contains_key(key) {
            return false;
        }
        self.started.insert(key.to_owned(), now);
        true
    }

    /// Whether `key` is still pending at `now`.
    #[must_use]
    pub fn is_pending_at(&self, key: &str, now: Instant) -> bool {
        self.started
            .get(key)
            .is_some_and(|&start| now.duration_since(start) < self.window)
    }

    /// Keys still pending at `now`, sorted.
    #[must_use]
    pub fn keys_at(&self, now: Instant) -> Vec<String> {
        let mut keys: Vec<String> = self
            .started
            .iter()
            .filter(|&(_, &start)| now.duration_since(start) < self.window)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of keys tracked, including expired ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.started.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }

    /// Forget every key.
    pub fn clear(&mut self) {
        self.started.clear();
    }

    fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.started.retain(|_, start| now.duration_since(*start) < window);
    }
}

//! Process-wide observability counters.
//!
//! Counters are global state by nature: every request must record into the
//! same registry so operators can watch a degraded reranker across the whole
//! process. The registry is cheap (atomics behind a concurrent map) and
//! injectable, so tests can observe increments in isolation.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonically increasing counters, labeled by component.
#[derive(Debug, Default)]
pub struct CounterRegistry {
    rerank_failures: DashMap<String, AtomicU64>,
}

impl CounterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one reranker timeout or failure for the given component.
    pub fn inc_rerank_failure(&self, component: &str) {
        self.rerank_failures
            .entry(component.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current reranker failure count for a component.
    pub fn rerank_failures(&self, component: &str) -> u64 {
        self.rerank_failures
            .get(component)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Snapshot of all reranker failure counters, keyed by component.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.rerank_failures
            .iter()
            .map(|entry| {
                (
                    format!("rerank_failures_total{{component=\"{}\"}}", entry.key()),
                    entry.value().load(Ordering::Relaxed),
                )
            })
            .collect()
    }
}

static GLOBAL: Lazy<Arc<CounterRegistry>> = Lazy::new(|| Arc::new(CounterRegistry::new()));

/// The process-global counter registry.
pub fn global() -> Arc<CounterRegistry> {
    Arc::clone(&GLOBAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_per_label() {
        let registry = CounterRegistry::new();
        assert_eq!(registry.rerank_failures("cross_encoder"), 0);

        registry.inc_rerank_failure("cross_encoder");
        registry.inc_rerank_failure("cross_encoder");
        registry.inc_rerank_failure("other");

        assert_eq!(registry.rerank_failures("cross_encoder"), 2);
        assert_eq!(registry.rerank_failures("other"), 1);
        assert_eq!(registry.rerank_failures("missing"), 0);
    }

    #[test]
    fn snapshot_labels_by_component() {
        let registry = CounterRegistry::new();
        registry.inc_rerank_failure("cross_encoder");

        let snapshot = registry.snapshot();
        assert_eq!(
            snapshot.get("rerank_failures_total{component=\"cross_encoder\"}"),
            Some(&1)
        );
    }
}

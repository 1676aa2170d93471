//! Router metrics
//!
//! Shared across every turn using the router: global counters are atomics,
//! per-provider figures sit behind one mutex that is held only for a map
//! update.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default, Clone)]
struct ProviderStats {
    decisions: u64,
    calls: u64,
    failures: u64,
    total_latency_ms: u64,
}

/// Live counters owned by a `ModelRouter`
#[derive(Debug, Default)]
pub struct RouterMetrics {
    decisions: AtomicU64,
    calls: AtomicU64,
    failures: AtomicU64,
    fallback_triggers: AtomicU64,
    exhausted: AtomicU64,
    providers: Mutex<BTreeMap<String, ProviderStats>>,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_decision(&self, provider: &str) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
        self.providers.lock().entry(provider.to_string()).or_default().decisions += 1;
    }

    pub fn record_success(&self, provider: &str, latency_ms: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let mut providers = self.providers.lock();
        let stats = providers.entry(provider.to_string()).or_default();
        stats.calls += 1;
        stats.total_latency_ms += latency_ms;
    }

    pub fn record_failure(&self, provider: &str, latency_ms: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
        let mut providers = self.providers.lock();
        let stats = providers.entry(provider.to_string()).or_default();
        stats.calls += 1;
        stats.failures += 1;
        stats.total_latency_ms += latency_ms;
    }

    /// A later chain entry is about to be tried
    pub fn record_fallback(&self) {
        self.fallback_triggers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let providers = self
            .providers
            .lock()
            .iter()
            .map(|(name, s)| {
                let avg = if s.calls == 0 {
                    0.0
                } else {
                    s.total_latency_ms as f64 / s.calls as f64
                };
                (
                    name.clone(),
                    ProviderMetrics {
                        decisions: s.decisions,
                        calls: s.calls,
                        failures: s.failures,
                        avg_latency_ms: avg,
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            total_decisions: self.decisions.load(Ordering::Relaxed),
            total_calls: self.calls.load(Ordering::Relaxed),
            total_failures: self.failures.load(Ordering::Relaxed),
            fallback_triggers: self.fallback_triggers.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            providers,
        }
    }
}

/// Point-in-time copy of the router counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_decisions: u64,
    pub total_calls: u64,
    pub total_failures: u64,
    pub fallback_triggers: u64,
    pub exhausted: u64,
    pub providers: BTreeMap<String, ProviderMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMetrics {
    pub decisions: u64,
    pub calls: u64,
    pub failures: u64,
    pub avg_latency_ms: f64,
}

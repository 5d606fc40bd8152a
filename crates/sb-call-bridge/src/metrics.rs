//! Metrics for bridged calls
//!
//! Lock-free counters updated on the dispatch and completion paths.
//!
//! ## Usage
//!
//! ```ignore
//! let snapshot = dispatcher.metrics().snapshot();
//! println!("{} in flight", snapshot.in_flight());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for the call dispatcher
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    /// Calls submitted to the script runtime
    pub calls_dispatched: AtomicU64,
    /// Calls whose success continuation ran
    pub calls_succeeded: AtomicU64,
    /// Calls the script runtime reported as failed
    pub remote_errors: AtomicU64,
    /// Payloads that could not be converted to the expected type
    pub conversion_failures: AtomicU64,
    /// Calls removed by the expiry sweep
    pub calls_timed_out: AtomicU64,
    /// Completions for unknown or already-resolved codes
    pub unknown_completions: AtomicU64,
    /// Results with no success continuation attached
    pub results_discarded: AtomicU64,
    /// Errors with neither an error continuation nor `throw_on_error`
    pub errors_dropped: AtomicU64,
    /// Errors raised to the fault sink
    pub faults_raised: AtomicU64,
    /// Cumulative dispatch-to-success latency in microseconds
    pub success_latency_us: AtomicU64,
}

impl BridgeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatched(&self) {
        self.calls_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delivered result
    ///
    /// # Arguments
    /// * `latency` - Time from dispatch to delivery
    pub fn record_success(&self, latency: Duration) {
        self.calls_succeeded.fetch_add(1, Ordering::Relaxed);
        self.success_latency_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_remote_error(&self) {
        self.remote_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conversion_failure(&self) {
        self.conversion_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.calls_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_completion(&self) {
        self.unknown_completions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.results_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_error(&self) {
        self.errors_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fault(&self) {
        self.faults_raised.fetch_add(1, Ordering::Relaxed);
    }

    /// Average dispatch-to-success latency in microseconds
    pub fn avg_success_latency_us(&self) -> u64 {
        let total = self.success_latency_us.load(Ordering::Relaxed);
        let count = self.calls_succeeded.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> BridgeMetricsSnapshot {
        BridgeMetricsSnapshot {
            calls_dispatched: self.calls_dispatched.load(Ordering::Relaxed),
            calls_succeeded: self.calls_succeeded.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            conversion_failures: self.conversion_failures.load(Ordering::Relaxed),
            calls_timed_out: self.calls_timed_out.load(Ordering::Relaxed),
            unknown_completions: self.unknown_completions.load(Ordering::Relaxed),
            results_discarded: self.results_discarded.load(Ordering::Relaxed),
            errors_dropped: self.errors_dropped.load(Ordering::Relaxed),
            faults_raised: self.faults_raised.load(Ordering::Relaxed),
            avg_success_latency_us: self.avg_success_latency_us(),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeMetricsSnapshot {
    pub calls_dispatched: u64,
    pub calls_succeeded: u64,
    pub remote_errors: u64,
    pub conversion_failures: u64,
    pub calls_timed_out: u64,
    pub unknown_completions: u64,
    pub results_discarded: u64,
    pub errors_dropped: u64,
    pub faults_raised: u64,
    pub avg_success_latency_us: u64,
}

impl BridgeMetricsSnapshot {
    /// Calls dispatched but not yet completed in any way
    pub fn in_flight(&self) -> u64 {
        let completed = self.calls_succeeded
            + self.remote_errors
            + self.conversion_failures
            + self.calls_timed_out
            + self.results_discarded;
        self.calls_dispatched.saturating_sub(completed)
    }
}

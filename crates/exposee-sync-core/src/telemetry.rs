//! Telemetry hooks for exposee synchronisation.
//!
//! Embedders implement [`SyncTelemetry`] to observe fetch outcomes without
//! wrapping the client. [`NoopTelemetry`] is installed by default and
//! [`CountingTelemetry`] keeps relaxed atomic counters that can be exported
//! to any metrics backend.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::SyncError;

/// Hook invoked once per completed fetch.
pub trait SyncTelemetry: Send + Sync {
    /// A fresh body was decoded into `records` entries.
    fn on_batch_decoded(&self, _records: usize) {}
    /// The cached validator matched; nothing was decoded.
    fn on_batch_unchanged(&self) {}
    /// The fetch terminated with `error`.
    fn on_sync_error(&self, _error: &SyncError) {}
}

/// Default telemetry implementation that performs no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl SyncTelemetry for NoopTelemetry {}

/// Aggregated telemetry counters (all values use relaxed atomics).
#[derive(Debug, Default)]
pub struct TelemetryCounters {
    batches_decoded: AtomicU64,
    records_decoded: AtomicU64,
    batches_unchanged: AtomicU64,
    network_errors: AtomicU64,
    status_errors: AtomicU64,
    time_inconsistencies: AtomicU64,
    decode_errors: AtomicU64,
}

impl TelemetryCounters {
    /// Captures a point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            batches_decoded: self.batches_decoded.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            batches_unchanged: self.batches_unchanged.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            status_errors: self.status_errors.load(Ordering::Relaxed),
            time_inconsistencies: self.time_inconsistencies.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Plain data representation of [`TelemetryCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Fetches that decoded a fresh body.
    pub batches_decoded: u64,
    /// Records decoded across all fresh bodies.
    pub records_decoded: u64,
    /// Fetches answered from a matching validator.
    pub batches_unchanged: u64,
    pub network_errors: u64,
    pub status_errors: u64,
    pub time_inconsistencies: u64,
    pub decode_errors: u64,
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batches_decoded={}, records_decoded={}, batches_unchanged={}, network_errors={}, status_errors={}, time_inconsistencies={}, decode_errors={}",
            self.batches_decoded,
            self.records_decoded,
            self.batches_unchanged,
            self.network_errors,
            self.status_errors,
            self.time_inconsistencies,
            self.decode_errors
        )
    }
}

/// Telemetry implementation that maintains atomic counters for every signal.
#[derive(Debug, Clone)]
pub struct CountingTelemetry {
    counters: Arc<TelemetryCounters>,
}

impl CountingTelemetry {
    /// Creates a new telemetry instance backed by the provided counter set.
    pub fn new(counters: Arc<TelemetryCounters>) -> Self {
        Self { counters }
    }

    /// Returns the underlying counter set.
    pub fn counters(&self) -> Arc<TelemetryCounters> {
        self.counters.clone()
    }
}

impl Default for CountingTelemetry {
    fn default() -> Self {
        Self::new(Arc::new(TelemetryCounters::default()))
    }
}

impl SyncTelemetry for CountingTelemetry {
    fn on_batch_decoded(&self, records: usize) {
        self.counters
            .batches_decoded
            .fetch_add(1, Ordering::Relaxed);
        self.counters
            .records_decoded
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    fn on_batch_unchanged(&self) {
        self.counters
            .batches_unchanged
            .fetch_add(1, Ordering::Relaxed);
    }

    fn on_sync_error(&self, error: &SyncError) {
        let counter = match error {
            SyncError::NetworkTransport(_) => &self.counters.network_errors,
            SyncError::InvalidResponseCode(_) => &self.counters.status_errors,
            SyncError::TimeInconsistency { .. } => &self.counters.time_inconsistencies,
            SyncError::PayloadDecodeFailure(_) => &self.counters.decode_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

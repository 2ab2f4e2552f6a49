// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture metrics
//!
//! Counters for what the engine saw, kept, dropped and persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Maximum fetch latencies kept for percentile calculation
const MAX_LATENCIES: usize = 10_000;

/// Capture metrics collector
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    /// Request events delivered to the engine
    requests_observed: AtomicU64,
    /// Events rejected (not capturing, not allow-listed, bad host)
    events_rejected: AtomicU64,
    /// Per-host cookie fetch attempts
    cookie_fetches: AtomicU64,
    /// Cookie fetches that failed or timed out
    fetch_failures: AtomicU64,
    /// Fields that changed a record
    fields_merged: AtomicU64,
    /// Fields dropped by the capture policy
    fields_filtered: AtomicU64,
    /// Snapshots written
    saves_ok: AtomicU64,
    /// Snapshot writes that failed
    saves_failed: AtomicU64,
    /// Start time for uptime calculation
    start_time: RwLock<Option<Instant>>,
    /// Cookie fetch latencies in milliseconds
    fetch_latencies: RwLock<Vec<u64>>,
}

/// Metrics report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub uptime_secs: u64,
    pub requests_observed: u64,
    pub events_rejected: u64,
    pub cookie_fetches: u64,
    pub fetch_failures: u64,
    pub fields_merged: u64,
    pub fields_filtered: u64,
    pub saves_ok: u64,
    pub saves_failed: u64,
    /// Cookie fetch latency percentiles
    pub fetch_p50_ms: u64,
    pub fetch_p95_ms: u64,
    pub fetch_p99_ms: u64,
}

impl CaptureMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        let metrics = Self::default();
        *metrics.start_time.write() = Some(Instant::now());
        metrics
    }

    pub fn record_request_observed(&self) {
        self.requests_observed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cookie fetch and its latency
    pub fn record_fetch(&self, latency_ms: u64, success: bool) {
        self.cookie_fetches.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        }

        let mut latencies = self.fetch_latencies.write();
        latencies.push(latency_ms);
        if latencies.len() > MAX_LATENCIES {
            latencies.drain(0..MAX_LATENCIES / 2);
        }
    }

    pub fn record_fields(&self, merged: usize, filtered: usize) {
        self.fields_merged.fetch_add(merged as u64, Ordering::Relaxed);
        self.fields_filtered.fetch_add(filtered as u64, Ordering::Relaxed);
    }

    pub fn record_save(&self, success: bool) {
        if success {
            self.saves_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.saves_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current report
    pub fn report(&self) -> MetricsReport {
        let uptime_secs = self
            .start_time
            .read()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);

        let latencies = self.fetch_latencies.read();
        let (p50, p95, p99) = calculate_percentiles(&latencies);

        MetricsReport {
            uptime_secs,
            requests_observed: self.requests_observed.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            cookie_fetches: self.cookie_fetches.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            fields_merged: self.fields_merged.load(Ordering::Relaxed),
            fields_filtered: self.fields_filtered.load(Ordering::Relaxed),
            saves_ok: self.saves_ok.load(Ordering::Relaxed),
            saves_failed: self.saves_failed.load(Ordering::Relaxed),
            fetch_p50_ms: p50,
            fetch_p95_ms: p95,
            fetch_p99_ms: p99,
        }
    }
}

/// Calculate percentiles from latencies
fn calculate_percentiles(latencies: &[u64]) -> (u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0);
    }

    let mut sorted: Vec<u64> = latencies.to_vec();
    sorted.sort_unstable();

    let len = sorted.len();
    let p50 = sorted[len / 2];
    let p95 = sorted[((len as f64 * 0.95) as usize).min(len - 1)];
    let p99 = sorted[((len as f64 * 0.99) as usize).min(len - 1)];

    (p50, p95, p99)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_basic() {
        let metrics = CaptureMetrics::new();

        metrics.record_request_observed();
        metrics.record_fetch(12, true);
        metrics.record_fetch(30, false);
        metrics.record_fields(2, 5);
        metrics.record_save(true);
        metrics.record_save(false);

        let report = metrics.report();
        assert_eq!(report.requests_observed, 1);
        assert_eq!(report.cookie_fetches, 2);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.fields_merged, 2);
        assert_eq!(report.fields_filtered, 5);
        assert_eq!(report.saves_ok, 1);
        assert_eq!(report.saves_failed, 1);
    }

    #[test]
    fn test_percentiles() {
        let latencies: Vec<u64> = (1..=100).collect();
        let (p50, p95, p99) = calculate_percentiles(&latencies);

        assert_eq!(p50, 51);
        assert_eq!(p95, 96);
        assert_eq!(p99, 100);
    }

    #[test]
    fn test_percentiles_single() {
        assert_eq!(calculate_percentiles(&[7]), (7, 7, 7));
    }
}

//! Metrics — lifetime service counters, updated once per scan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use scanner::ScanStats;
use serde::Serialize;

/// All operations use `Ordering::Relaxed`; the counters feed an
/// observability endpoint and individual reads never need to be
/// consistent with each other.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    scans_total: AtomicU64,
    scan_failures_total: AtomicU64,
    lines_scanned_total: AtomicU64,
    games_parsed_total: AtomicU64,
    kills_seen_total: AtomicU64,
    last_scan_millis: AtomicU64,
}

/// Point-in-time snapshot for the metrics endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    pub scans_total: u64,
    pub scan_failures_total: u64,
    pub lines_scanned_total: u64,
    pub games_parsed_total: u64,
    pub kills_seen_total: u64,
    pub last_scan_millis: u64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed scan.
    pub fn scan_completed(&self, stats: &ScanStats, elapsed: Duration) {
        self.scans_total.fetch_add(1, Ordering::Relaxed);
        self.lines_scanned_total
            .fetch_add(stats.lines, Ordering::Relaxed);
        self.games_parsed_total
            .fetch_add(stats.games_completed, Ordering::Relaxed);
        self.kills_seen_total
            .fetch_add(stats.kills, Ordering::Relaxed);
        self.last_scan_millis
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a scan that returned an error.
    pub fn scan_failed(&self) {
        self.scan_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            scans_total: self.scans_total.load(Ordering::Relaxed),
            scan_failures_total: self.scan_failures_total.load(Ordering::Relaxed),
            lines_scanned_total: self.lines_scanned_total.load(Ordering::Relaxed),
            games_parsed_total: self.games_parsed_total.load(Ordering::Relaxed),
            kills_seen_total: self.kills_seen_total.load(Ordering::Relaxed),
            last_scan_millis: self.last_scan_millis.load(Ordering::Relaxed),
        }
    }
}

//! Performance Monitor
//!
//! Collects (operation, duration) records from HTTP and query call sites,
//! warns when an operation crosses its slowness threshold, and summarizes
//! the trailing hour on demand. Records older than the retention window
//! are dropped by a periodic trim.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

/// Window covered by [`PerfMonitor::summary`].
pub const SUMMARY_WINDOW: Duration = Duration::from_secs(60 * 60);

// == Thresholds ==
/// Slowness thresholds, one per call-site class.
#[derive(Debug, Clone, Copy)]
pub struct PerfThresholds {
    /// Queries slower than this are logged as slow
    pub slow_query: Duration,
    /// HTTP requests slower than this are logged as slow
    pub slow_request: Duration,
    /// Memory growth beyond this (when reported) is logged
    pub high_memory_delta_bytes: u64,
}

impl Default for PerfThresholds {
    fn default() -> Self {
        Self {
            slow_query: Duration::from_millis(100),
            slow_request: Duration::from_millis(1000),
            high_memory_delta_bytes: 50 * 1024 * 1024,
        }
    }
}

// == Operation Record ==
/// One recorded operation.
#[derive(Debug, Clone)]
struct OpRecord {
    /// When the operation was recorded
    at: Instant,
    /// What ran: "GET /path" for requests, the query text for queries
    description: String,
    /// How long it took
    duration: Duration,
    /// Response status for HTTP call sites, absent for queries
    status: Option<u16>,
    /// Heap growth reported by the call site, if it measures one
    memory_delta_bytes: Option<u64>,
}

// == Performance Monitor ==
/// Append/trim/summarize collector for operation timings.
#[derive(Debug)]
pub struct PerfMonitor {
    records: Vec<OpRecord>,
    thresholds: PerfThresholds,
    /// Records older than this are dropped on trim
    retention: Duration,
}

impl PerfMonitor {
    // == Constructor ==
    /// Creates an empty monitor.
    pub fn new(thresholds: PerfThresholds, retention: Duration) -> Self {
        Self {
            records: Vec::new(),
            thresholds,
            retention,
        }
    }

    // == Record Query ==
    /// Records a data-access operation; warns if it crossed the
    /// slow-query threshold.
    pub fn record_query(&mut self, description: &str, duration: Duration) {
        if duration > self.thresholds.slow_query {
            warn!(
                query = %description,
                duration_ms = duration.as_millis() as u64,
                "slow query detected"
            );
        }

        self.records.push(OpRecord {
            at: Instant::now(),
            description: description.to_string(),
            duration,
            status: None,
            memory_delta_bytes: None,
        });
    }

    // == Record Request ==
    /// Records a completed HTTP request; warns on slow responses and on
    /// high memory growth when the call site reports a delta.
    pub fn record_request(
        &mut self,
        method: &str,
        path: &str,
        status: u16,
        duration: Duration,
        memory_delta_bytes: Option<u64>,
    ) {
        if duration > self.thresholds.slow_request {
            warn!(
                method,
                path,
                duration_ms = duration.as_millis() as u64,
                "slow request detected"
            );
        }

        if let Some(delta) = memory_delta_bytes {
            if delta > self.thresholds.high_memory_delta_bytes {
                warn!(
                    method,
                    path,
                    delta_mb = delta / (1024 * 1024),
                    "high memory usage detected"
                );
            }
        }

        self.records.push(OpRecord {
            at: Instant::now(),
            description: format!("{} {}", method, path),
            duration,
            status: Some(status),
            memory_delta_bytes,
        });
    }

    // == Summary ==
    /// Aggregates the records from the trailing hour. Queries count
    /// toward totals and durations; only HTTP records can contribute
    /// errors or memory deltas.
    pub fn summary(&self) -> PerfSummary {
        let now = Instant::now();
        let recent: Vec<&OpRecord> = self
            .records
            .iter()
            .filter(|r| now.saturating_duration_since(r.at) <= SUMMARY_WINDOW)
            .collect();

        if recent.is_empty() {
            return PerfSummary::default();
        }

        let total = recent.len() as u64;
        let total_duration: Duration = recent.iter().map(|r| r.duration).sum();
        let slow = recent
            .iter()
            .filter(|r| r.duration > self.thresholds.slow_request)
            .count() as u64;
        let errors = recent
            .iter()
            .filter(|r| r.status.is_some_and(|s| s >= 400))
            .count() as u64;

        let deltas: Vec<u64> = recent.iter().filter_map(|r| r.memory_delta_bytes).collect();
        let memory = if deltas.is_empty() {
            MemorySummary::default()
        } else {
            let sum: u64 = deltas.iter().sum();
            let peak = deltas.iter().copied().max().unwrap_or(0);
            MemorySummary {
                average_mb: round2(sum as f64 / deltas.len() as f64 / (1024.0 * 1024.0)),
                peak_mb: round2(peak as f64 / (1024.0 * 1024.0)),
            }
        };

        PerfSummary {
            total_operations: total,
            average_duration_ms: (total_duration.as_millis() as f64 / total as f64).round() as u64,
            slow_operations: slow,
            error_rate: round2(errors as f64 / total as f64 * 100.0),
            memory,
        }
    }

    // == Trim ==
    /// Drops records older than the retention window; returns the count
    /// removed.
    pub fn trim(&mut self) -> usize {
        let now = Instant::now();
        let before = self.records.len();
        let retention = self.retention;
        self.records
            .retain(|r| now.saturating_duration_since(r.at) <= retention);

        let removed = before - self.records.len();
        if removed > 0 {
            info!(removed, "trimmed old performance records");
        }
        removed
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// == Summary Types ==
/// Aggregate view over the summary window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerfSummary {
    /// Operations recorded in the window
    pub total_operations: u64,
    /// Mean duration, rounded to whole milliseconds
    pub average_duration_ms: u64,
    /// Operations slower than the slow-request threshold
    pub slow_operations: u64,
    /// Percentage of HTTP operations with status >= 400
    pub error_rate: f64,
    /// Memory growth over records that reported a delta
    pub memory: MemorySummary,
}

/// Memory growth aggregates in megabytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemorySummary {
    /// Mean reported delta
    pub average_mb: f64,
    /// Largest reported delta
    pub peak_mb: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> PerfMonitor {
        PerfMonitor::new(PerfThresholds::default(), Duration::from_secs(24 * 60 * 60))
    }

    #[test]
    fn test_monitor_starts_empty() {
        let m = monitor();
        assert!(m.is_empty());
        assert_eq!(m.summary(), PerfSummary::default());
    }

    #[test]
    fn test_record_query_appends() {
        let mut m = monitor();

        m.record_query("products.find({})", Duration::from_millis(20));
        m.record_query("orders.find({})", Duration::from_millis(250));

        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_summary_counts_and_average() {
        let mut m = monitor();

        m.record_request("GET", "/entries/a", 200, Duration::from_millis(100), None);
        m.record_request("GET", "/entries/b", 200, Duration::from_millis(300), None);

        let summary = m.summary();
        assert_eq!(summary.total_operations, 2);
        assert_eq!(summary.average_duration_ms, 200);
        assert_eq!(summary.slow_operations, 0);
        assert_eq!(summary.error_rate, 0.0);
    }

    #[test]
    fn test_summary_slow_and_error_rate() {
        let mut m = monitor();

        m.record_request("GET", "/a", 200, Duration::from_millis(1500), None);
        m.record_request("GET", "/b", 500, Duration::from_millis(50), None);
        m.record_request("GET", "/c", 404, Duration::from_millis(50), None);
        m.record_request("GET", "/d", 200, Duration::from_millis(50), None);

        let summary = m.summary();
        assert_eq!(summary.total_operations, 4);
        assert_eq!(summary.slow_operations, 1);
        assert_eq!(summary.error_rate, 50.0);
    }

    #[test]
    fn test_summary_queries_count_as_operations_not_errors() {
        let mut m = monitor();

        m.record_query("users.find({})", Duration::from_millis(80));
        m.record_request("GET", "/a", 500, Duration::from_millis(80), None);

        let summary = m.summary();
        assert_eq!(summary.total_operations, 2);
        assert_eq!(summary.error_rate, 50.0);
    }

    #[test]
    fn test_summary_memory_aggregates() {
        let mut m = monitor();
        let mb = 1024 * 1024;

        m.record_request("GET", "/a", 200, Duration::from_millis(10), Some(2 * mb));
        m.record_request("GET", "/b", 200, Duration::from_millis(10), Some(6 * mb));
        m.record_request("GET", "/c", 200, Duration::from_millis(10), None);

        let summary = m.summary();
        assert_eq!(summary.memory.average_mb, 4.0);
        assert_eq!(summary.memory.peak_mb, 6.0);
    }

    #[test]
    fn test_summary_excludes_records_outside_window() {
        let mut m = monitor();

        m.record_request("GET", "/old", 200, Duration::from_millis(10), None);
        m.record_request("GET", "/new", 200, Duration::from_millis(30), None);

        // Age the first record out of the summary window
        m.records[0].at -= SUMMARY_WINDOW + Duration::from_secs(1);

        let summary = m.summary();
        assert_eq!(summary.total_operations, 1);
        assert_eq!(summary.average_duration_ms, 30);
    }

    #[test]
    fn test_trim_drops_old_records() {
        let mut m = monitor();

        m.record_query("q1", Duration::from_millis(10));
        m.record_query("q2", Duration::from_millis(10));
        m.record_query("q3", Duration::from_millis(10));

        // Age two records past the retention window
        let past = Duration::from_secs(25 * 60 * 60);
        m.records[0].at -= past;
        m.records[1].at -= past;

        assert_eq!(m.trim(), 2);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_trim_keeps_recent_records() {
        let mut m = monitor();

        m.record_query("q1", Duration::from_millis(10));

        assert_eq!(m.trim(), 0);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_summary_serializes() {
        let mut m = monitor();
        m.record_request("GET", "/a", 200, Duration::from_millis(10), None);

        let json = serde_json::to_value(m.summary()).unwrap();
        assert_eq!(json["total_operations"], 1);
        assert!(json.get("memory").is_some());
    }
}

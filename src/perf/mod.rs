//! Performance Module
//!
//! Slow-operation detection and an in-memory record of recent operation
//! timings, summarized on demand.

use std::sync::Arc;

use tokio::sync::RwLock;

mod monitor;

pub use monitor::{MemorySummary, PerfMonitor, PerfSummary, PerfThresholds};

/// Monitor handle shared between the HTTP layer, query call sites, and
/// the background trim task.
pub type SharedPerfMonitor = Arc<RwLock<PerfMonitor>>;

/// Wraps a monitor for shared use.
pub fn shared(monitor: PerfMonitor) -> SharedPerfMonitor {
    Arc::new(RwLock::new(monitor))
}

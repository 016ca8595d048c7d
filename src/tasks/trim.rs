//! Performance Record Trim Task
//!
//! Background task that periodically drops performance records older
//! than the retention window.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::perf::SharedPerfMonitor;

/// Spawns a background task that trims old performance records.
///
/// The task loops forever, sleeping for `interval` between runs. The
/// returned handle is used to abort it during graceful shutdown; the
/// process owner is responsible for doing so.
///
/// # Example
/// ```ignore
/// let handle = spawn_trim_task(state.perf.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_trim_task(perf: SharedPerfMonitor, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "starting perf trim task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut monitor = perf.write().await;
                monitor.trim()
            };

            if removed == 0 {
                debug!("perf trim: nothing to remove");
            }
        }
    })
}

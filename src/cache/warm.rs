//! Cache Warming Module
//!
//! Pre-populates a batch of keys concurrently so the first real request
//! for each does not pay the cold-cache cost.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::cache::SharedCache;

// == Warm Outcome ==
/// Per-key result of a warming batch.
#[derive(Debug)]
pub struct WarmOutcome {
    /// The key that was warmed
    pub key: String,
    /// Ok if the fetch succeeded and the value was stored
    pub result: anyhow::Result<()>,
}

impl WarmOutcome {
    /// Returns true if this key was fetched and stored.
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

// == Warm Cache ==
/// Fetches and stores a value for every key in `keys`, all concurrently.
///
/// One key's fetch failure never aborts the others: the error is logged,
/// captured in that key's outcome, and the batch runs to completion. The
/// returned list has one outcome per input key, in input order, so the
/// caller can audit which keys failed to warm.
pub async fn warm_cache<V, F, Fut>(
    cache: &SharedCache<V>,
    keys: Vec<String>,
    fetcher: F,
    ttl: Option<Duration>,
) -> Vec<WarmOutcome>
where
    V: Clone,
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<V>>,
{
    let total = keys.len();
    info!(total, "warming cache");

    let outcomes = join_all(keys.into_iter().map(|key| {
        let fetch = fetcher(key.clone());
        async move {
            match fetch.await {
                Ok(value) => {
                    cache.write().await.set(key.clone(), value, ttl);
                    WarmOutcome {
                        key,
                        result: Ok(()),
                    }
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "cache warm fetch failed");
                    WarmOutcome {
                        key,
                        result: Err(err),
                    }
                }
            }
        }
    }))
    .await;

    let successful = outcomes.iter().filter(|o| o.succeeded()).count();
    info!(successful, total, "cache warming completed");

    outcomes
}

//! Memoization Module
//!
//! Wraps an async unit of work so repeated calls within the TTL return
//! the cached result instead of recomputing.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::cache::SharedCache;

// == Cache Key ==
/// Builds a cache key from a stable identifier and the call's arguments.
///
/// The arguments are JSON-serialized, so two calls with equal arguments
/// map to the same key. Callers name the operation explicitly; nothing is
/// inferred from the function itself.
pub fn cache_key<A: Serialize>(namespace: &str, args: &A) -> String {
    match serde_json::to_string(args) {
        Ok(rendered) => format!("{}:{}", namespace, rendered),
        Err(err) => {
            warn!(namespace, error = %err, "cache key arguments failed to serialize");
            format!("{}:<unserializable>", namespace)
        }
    }
}

// == Get Or Compute ==
/// Returns the cached value under `key`, or runs `compute` and caches its
/// result.
///
/// On a hit the computation never runs, so none of its side effects
/// occur. On a miss the result is stored only on success; an error
/// propagates to the caller and leaves the cache untouched (no negative
/// caching).
///
/// Concurrent misses for the same key are not coalesced: both callers
/// compute and both store, last write wins. The lock is released across
/// the `compute` await, so cache access never blocks on the computation.
pub async fn get_or_compute<V, E, F, Fut>(
    cache: &SharedCache<V>,
    key: &str,
    ttl: Option<Duration>,
    compute: F,
) -> Result<V, E>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(hit) = cache.write().await.get(key) {
        return Ok(hit);
    }

    let value = compute().await?;
    cache.write().await.set(key.to_string(), value.clone(), ttl);
    Ok(value)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::cache::{shared, TtlCache};

    fn test_cache() -> SharedCache<String> {
        shared(TtlCache::new(100, Duration::from_secs(300)))
    }

    #[test]
    fn test_cache_key_stable_for_equal_args() {
        let a = cache_key("users:find", &("alice", 7));
        let b = cache_key("users:find", &("alice", 7));
        assert_eq!(a, b);
        assert!(a.starts_with("users:find:"));
    }

    #[test]
    fn test_cache_key_distinct_for_different_args() {
        let a = cache_key("users:find", &1);
        let b = cache_key("users:find", &2);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_miss_computes_and_caches() {
        let cache = test_cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let result = get_or_compute(&cache, "op:1", None, || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>("computed".to_string())
        })
        .await
        .unwrap();

        assert_eq!(result, "computed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.write().await.get("op:1"), Some("computed".to_string()));
    }

    #[tokio::test]
    async fn test_hit_skips_computation() {
        let cache = test_cache();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = calls.clone();
            let result = get_or_compute(&cache, "op:1", None, || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>("computed".to_string())
            })
            .await
            .unwrap();
            assert_eq!(result, "computed");
        }

        // Only the first call ran the computation
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_propagates_and_caches_nothing() {
        let cache = test_cache();

        let result = get_or_compute(&cache, "op:fail", None, || async {
            Err::<String, _>(anyhow::anyhow!("upstream failed"))
        })
        .await;

        assert!(result.is_err());
        assert!(!cache.write().await.has("op:fail"));

        // The next call retries normally
        let result = get_or_compute(&cache, "op:fail", None, || async {
            Ok::<_, anyhow::Error>("recovered".to_string())
        })
        .await
        .unwrap();
        assert_eq!(result, "recovered");
    }

    #[tokio::test]
    async fn test_expired_entry_recomputes() {
        let cache = test_cache();

        let first = get_or_compute(&cache, "op:1", Some(Duration::from_millis(50)), || async {
            Ok::<_, anyhow::Error>("first".to_string())
        })
        .await
        .unwrap();
        assert_eq!(first, "first");

        cache.write().await.backdate("op:1", Duration::from_millis(100));

        let second = get_or_compute(&cache, "op:1", None, || async {
            Ok::<_, anyhow::Error>("second".to_string())
        })
        .await
        .unwrap();
        assert_eq!(second, "second");
    }
}

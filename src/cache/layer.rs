//! Cache layer with per-key request coalescing.
//!
//! `get_or_resolve` guarantees at most one in-flight resolution per key:
//! concurrent callers for the same key while a resolution is running all
//! await that single resolution's outcome instead of each fanning out to
//! the providers. Callers for different keys proceed independently.
//!
//! The first caller for a key becomes the leader and owns the resolution;
//! everyone else follows a `tokio::sync::watch` channel registered in the
//! in-flight map. If the leader is cancelled before publishing, a follower
//! cleans up the stale registration and takes over.
//!
//! Found results are cached with the positive TTL, confirmed-absent ones
//! with the (shorter) negative TTL.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::config::CacheConfig;
use crate::resolver::LyricsResult;

use super::memory::{CacheStats, CachedOutcome, MemoryCache};

type OutcomeReceiver = watch::Receiver<Option<CachedOutcome>>;
type OutcomeSender = watch::Sender<Option<CachedOutcome>>;

/// Memory cache plus the in-flight resolution map.
pub struct CacheLayer {
    memory: MemoryCache,
    in_flight: Mutex<HashMap<String, OutcomeReceiver>>,
    positive_ttl: Duration,
    negative_ttl: Duration,
}

enum Step {
    /// Another caller already published the outcome.
    Done(CachedOutcome),
    /// This caller owns the resolution.
    Lead(OutcomeSender),
    /// A resolution is in flight; await its outcome.
    Wait(OutcomeReceiver),
}

impl CacheLayer {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            memory: MemoryCache::new(config.max_entries),
            positive_ttl: config.positive_ttl(),
            negative_ttl: config.negative_ttl(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Direct cache read; expired entries are absent.
    pub fn get(&self, key: &str) -> Option<CachedOutcome> {
        self.memory.get(key)
    }

    /// Direct cache write with the TTL matching the outcome kind.
    pub fn put(&self, key: &str, outcome: CachedOutcome) {
        let ttl = self.ttl_for(&outcome);
        self.memory.put(key, outcome, ttl);
    }

    /// Serve `key` from cache, or run `resolve` exactly once no matter how
    /// many callers arrive while it is running.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> CachedOutcome
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Option<LyricsResult>>,
    {
        loop {
            let step = {
                let mut in_flight = self.in_flight.lock();
                // Check the cache under the lock: a leader may have just
                // published between our fast-path miss and here.
                if let Some(outcome) = self.memory.get(key) {
                    Step::Done(outcome)
                } else if let Some(rx) = in_flight.get(key) {
                    Step::Wait(rx.clone())
                } else {
                    let (tx, rx) = watch::channel(None);
                    in_flight.insert(key.to_string(), rx);
                    Step::Lead(tx)
                }
            };

            match step {
                Step::Done(outcome) => return outcome,
                Step::Lead(tx) => {
                    let result = resolve().await;
                    return self.finish(key, result, tx);
                }
                Step::Wait(rx) => {
                    if let Some(outcome) = self.follow(key, rx).await {
                        return outcome;
                    }
                    // Leader vanished without publishing; try again.
                }
            }
        }
    }

    /// Await an in-flight resolution. `None` means the leader was dropped
    /// before publishing; the stale registration has been cleaned up and the
    /// caller should retry.
    async fn follow(&self, key: &str, mut rx: OutcomeReceiver) -> Option<CachedOutcome> {
        loop {
            let published = rx.borrow_and_update().as_ref().cloned();
            if let Some(outcome) = published {
                return Some(outcome);
            }
            if rx.changed().await.is_err() {
                debug!(key, "in-flight resolution abandoned, retrying");
                let mut in_flight = self.in_flight.lock();
                if in_flight.get(key).is_some_and(|stored| stored.has_changed().is_err()) {
                    in_flight.remove(key);
                }
                return None;
            }
        }
    }

    fn finish(&self, key: &str, result: Option<LyricsResult>, tx: OutcomeSender) -> CachedOutcome {
        let outcome = match result {
            Some(found) => CachedOutcome::Found(found),
            None => CachedOutcome::NotFound,
        };
        self.put(key, outcome.clone());
        self.in_flight.lock().remove(key);
        let _ = tx.send(Some(outcome.clone()));
        outcome
    }

    fn ttl_for(&self, outcome: &CachedOutcome) -> Duration {
        match outcome {
            CachedOutcome::Found(_) => self.positive_ttl,
            CachedOutcome::NotFound => self.negative_ttl,
        }
    }

    /// Remove expired entries and enforce capacity.
    pub fn sweep(&self) -> usize {
        self.memory.sweep()
    }

    pub fn stats(&self) -> CacheStats {
        self.memory.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{LyricsResult, SourceId};
    use chrono::{TimeDelta, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn layer() -> Arc<CacheLayer> {
        Arc::new(CacheLayer::new(&CacheConfig::default()))
    }

    fn found(key: &str) -> LyricsResult {
        let now = Utc::now();
        LyricsResult {
            key: key.to_string(),
            lyrics: "la la la".to_string(),
            source: SourceId::Lrclib,
            score: 0.97,
            resolved_at: now,
            expires_at: now + TimeDelta::hours(24),
        }
    }

    #[tokio::test]
    async fn test_resolves_once_then_serves_from_cache() {
        // Scenario E shape: repeated query within the TTL window triggers
        // zero further resolutions.
        let layer = layer();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let outcome = layer
                .get_or_resolve("k", move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Some(found("k"))
                    }
                })
                .await;
            assert!(matches!(outcome, CachedOutcome::Found(_)));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_resolution() {
        let layer = layer();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let layer = Arc::clone(&layer);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                layer
                    .get_or_resolve("same-key", move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            // Hold the resolution open long enough for every
                            // caller to pile up behind it.
                            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                            Some(found("same-key"))
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(matches!(outcome, CachedOutcome::Found(_)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_keys_resolve_independently() {
        let layer = layer();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for key in ["alpha", "beta"] {
            let layer = Arc::clone(&layer);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                layer
                    .get_or_resolve(key, move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                            Some(found(key))
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        // One resolution per key, not one total
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_negative_outcome_cached() {
        let layer = layer();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            let outcome = layer
                .get_or_resolve("missing", move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        None
                    }
                })
                .await;
            assert_eq!(outcome, CachedOutcome::NotFound);
        }

        // Second lookup hits the negative cache
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_negative_entry_triggers_re_resolution() {
        let config = CacheConfig {
            negative_ttl_secs: 0,
            ..Default::default()
        };
        let layer = Arc::new(CacheLayer::new(&config));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            layer
                .get_or_resolve("missing", move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        None
                    }
                })
                .await;
        }

        // Zero negative TTL: the retry mechanism is a fresh resolution
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_leader_does_not_wedge_the_key() {
        let layer = layer();

        // Leader that will never publish: cancelled mid-resolution.
        let leader = {
            let layer = Arc::clone(&layer);
            tokio::spawn(async move {
                layer
                    .get_or_resolve("k", || async {
                        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                        Some(found("k"))
                    })
                    .await
            })
        };

        // Give the leader time to register, then cancel it.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        leader.abort();
        let _ = leader.await;

        // A later caller takes over and resolves.
        let outcome = layer
            .get_or_resolve("k", || async { Some(found("k")) })
            .await;
        assert!(matches!(outcome, CachedOutcome::Found(_)));
    }

    #[tokio::test]
    async fn test_direct_get_put() {
        let layer = layer();
        assert!(layer.get("k").is_none());
        layer.put("k", CachedOutcome::NotFound);
        assert_eq!(layer.get("k"), Some(CachedOutcome::NotFound));
        assert_eq!(layer.stats().entries, 1);
    }
}

//! In-memory cache store with TTL expiry and LRU eviction.
//!
//! Expiry is checked lazily on every read - an entry past its deadline is
//! treated as absent and removed. `sweep` does the same eagerly and then
//! evicts least-recently-used entries down to the configured capacity.
//!
//! Negative results ("we looked, nothing there") are cached alongside
//! positive ones so a burst of lookups for a missing song doesn't hammer
//! the providers.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::resolver::LyricsResult;

/// What a cache slot remembers about a key.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedOutcome {
    Found(LyricsResult),
    NotFound,
}

#[derive(Debug)]
struct Entry {
    outcome: CachedOutcome,
    expires_at: Instant,
    last_used: u64,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct Inner {
    map: HashMap<String, Entry>,
    // Monotonic touch counter; lowest value = least recently used
    clock: u64,
    hits: u64,
    misses: u64,
}

/// Cache hit/miss counters plus current size.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// TTL + LRU cache keyed by normalized query keys.
#[derive(Debug)]
pub struct MemoryCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Look up a key. Expired entries count as misses and are removed.
    pub fn get(&self, key: &str) -> Option<CachedOutcome> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let expired = match inner.map.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                inner.misses += 1;
                return None;
            }
        };

        if expired {
            inner.map.remove(key);
            inner.misses += 1;
            return None;
        }

        inner.clock += 1;
        let clock = inner.clock;
        if let Some(entry) = inner.map.get_mut(key) {
            entry.last_used = clock;
            let outcome = entry.outcome.clone();
            inner.hits += 1;
            Some(outcome)
        } else {
            inner.misses += 1;
            None
        }
    }

    /// Insert or overwrite a key with the given TTL.
    pub fn put(&self, key: impl Into<String>, outcome: CachedOutcome, ttl: Duration) {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        inner.clock += 1;
        let entry = Entry {
            outcome,
            expires_at: now + ttl,
            last_used: inner.clock,
        };
        inner.map.insert(key.into(), entry);

        if inner.map.len() > self.capacity {
            Self::evict(&mut inner, self.capacity, now);
        }
    }

    /// Remove expired entries, then LRU-evict down to capacity.
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let before = inner.map.len();

        Self::evict(&mut inner, self.capacity, now);

        let removed = before - inner.map.len();
        if removed > 0 {
            debug!(removed, "cache sweep");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.map.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }

    fn evict(inner: &mut Inner, capacity: usize, now: Instant) {
        inner.map.retain(|_, entry| !entry.is_expired(now));

        while inner.map.len() > capacity {
            let Some(oldest) = inner
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            inner.map.remove(&oldest);
        }
    }
}

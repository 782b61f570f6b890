//! Resolution engine facade - the single entry point for lyrics lookups.
//!
//! Composes the normalizer, cache layer, persistent store, and resolver:
//! query -> cache key -> coalesced cache lookup -> store tier -> provider
//! fan-out -> write-back. "No lyrics found" is a normal outcome; the only
//! errors this module produces are configuration problems, surfaced at
//! construction and never mid-lookup.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{CacheLayer, CacheStats, CachedOutcome};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolver::{
    LyricsResolution, LyricsSource, Matcher, Query, Resolver, SourceId,
    lrclib::LrclibClient, ovh::LyricsOvhClient,
};
use crate::storage::LyricsStore;

/// The lyrics resolution engine.
///
/// Constructed once per process; cheap to share behind an `Arc`.
pub struct LyricsService {
    cache: CacheLayer,
    resolver: Resolver,
    store: Option<Arc<dyn LyricsStore>>,
}

impl std::fmt::Debug for LyricsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LyricsService")
            .field("sources", &self.resolver.source_count())
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl LyricsService {
    /// Build the engine with the real provider clients from configuration.
    ///
    /// Fails fast on configuration problems: no providers enabled, an
    /// unknown provider name, or matcher settings out of range.
    pub fn new(config: &Config, store: Option<Arc<dyn LyricsStore>>) -> Result<Self> {
        let sources = build_sources(config)?;
        Self::with_sources(config, sources, store)
    }

    /// Build the engine over explicit sources (used by tests with mocks).
    pub fn with_sources(
        config: &Config,
        sources: Vec<Arc<dyn LyricsSource>>,
        store: Option<Arc<dyn LyricsStore>>,
    ) -> Result<Self> {
        validate(config, sources.len())?;

        let matcher = Matcher::new(&config.matcher);
        let resolver = Resolver::new(
            sources,
            matcher,
            &config.resolver,
            config.cache.positive_ttl(),
        );

        info!(
            sources = resolver.source_count(),
            threshold = config.matcher.accept_threshold,
            "lyrics engine ready"
        );

        Ok(Self {
            cache: CacheLayer::new(&config.cache),
            resolver,
            store,
        })
    }

    /// Resolve lyrics for an (artist, title) pair.
    ///
    /// Repeated queries for the same song within the TTL window are served
    /// from cache; concurrent queries for the same song share a single
    /// provider fan-out.
    pub async fn resolve(&self, artist: &str, title: &str) -> LyricsResolution {
        let query = Query::new(artist, title);

        let store = self.store.as_deref();
        let resolver = &self.resolver;
        let q = &query;

        let outcome = self
            .cache
            .get_or_resolve(&query.key, move || async move {
                // Persistent tier before hitting the network.
                if let Some(store) = store {
                    match store.get(&q.key).await {
                        Ok(Some(result)) => return Some(result),
                        Ok(None) => {}
                        Err(e) => warn!(key = %q.key, error = %e, "store read failed"),
                    }
                }

                let resolved = resolver.resolve(q).await;

                if let (Some(store), Some(result)) = (store, &resolved) {
                    if let Err(e) = store.put(result).await {
                        warn!(key = %q.key, error = %e, "store write failed");
                    }
                }

                resolved
            })
            .await;

        match outcome {
            CachedOutcome::Found(result) => LyricsResolution::Found(result),
            CachedOutcome::NotFound => LyricsResolution::NotFound,
        }
    }

    /// Memory cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop expired cache entries and enforce the capacity bound.
    pub fn sweep_cache(&self) -> usize {
        self.cache.sweep()
    }
}

/// Instantiate provider clients in configured priority order.
fn build_sources(config: &Config) -> Result<Vec<Arc<dyn LyricsSource>>> {
    config
        .providers
        .enabled
        .iter()
        .map(|name| {
            let id = SourceId::from_name(name)
                .ok_or_else(|| Error::config(format!("unknown provider '{name}'")))?;
            let source: Arc<dyn LyricsSource> = match id {
                SourceId::Lrclib => Arc::new(LrclibClient::new()),
                SourceId::LyricsOvh => Arc::new(LyricsOvhClient::new()),
            };
            Ok(source)
        })
        .collect()
}

/// Reject configurations the engine cannot run with.
fn validate(config: &Config, source_count: usize) -> Result<()> {
    if source_count == 0 {
        return Err(Error::config("no lyrics providers enabled"));
    }

    let m = &config.matcher;
    if !(0.0..=1.0).contains(&m.accept_threshold) {
        return Err(Error::config(format!(
            "accept_threshold must be within [0, 1], got {}",
            m.accept_threshold
        )));
    }
    if m.title_weight < 0.0 || m.artist_weight < 0.0 || m.title_weight + m.artist_weight <= 0.0 {
        return Err(Error::config("matcher weights must be non-negative and sum above zero"));
    }

    Ok(())
}

//! Concurrent resolution across all configured lyrics sources.
//!
//! One resolution fans out to every source at once, bounded two ways: each
//! fetch gets a per-source timeout, and the whole pass runs under a global
//! deadline. Sources that error or time out are excluded from the candidate
//! set; whatever arrived in time is scored and the winner picked
//! deterministically. External unavailability is never an error here - the
//! worst outcome of a resolution is "not found".

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ResolverConfig;

use super::domain::{Candidate, LyricsResult, Query, SourceError, SourceId};
use super::matcher::Matcher;
use super::traits::LyricsSource;

/// Orchestrates the provider fan-out and winner selection.
pub struct Resolver {
    sources: Vec<Arc<dyn LyricsSource>>,
    matcher: Matcher,
    source_timeout: Duration,
    global_deadline: Duration,
    positive_ttl: TimeDelta,
}

impl Resolver {
    /// Build a resolver over the given sources. Source order is priority
    /// order: index 0 wins exact score ties.
    pub fn new(
        sources: Vec<Arc<dyn LyricsSource>>,
        matcher: Matcher,
        timeouts: &ResolverConfig,
        positive_ttl: Duration,
    ) -> Self {
        Self {
            sources,
            matcher,
            source_timeout: timeouts.source_timeout(),
            global_deadline: timeouts.global_deadline(),
            positive_ttl: TimeDelta::from_std(positive_ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Resolve a query against all sources. Returns `None` when no candidate
    /// clears the acceptance threshold - including the degenerate case where
    /// every source failed.
    pub async fn resolve(&self, query: &Query) -> Option<LyricsResult> {
        let candidates = self.collect_candidates(query).await;

        if candidates.is_empty() {
            warn!(key = %query.key, "no source produced a candidate");
            return None;
        }

        let Some((winner, score)) = self.matcher.select(query, candidates) else {
            debug!(key = %query.key, "no candidate cleared the accept threshold");
            return None;
        };

        debug!(key = %query.key, source = %winner.source, score, "resolved");

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.positive_ttl)
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
        Some(LyricsResult {
            key: query.key.clone(),
            lyrics: winner.lyrics,
            source: winner.source,
            score,
            resolved_at: now,
            expires_at,
        })
    }

    /// Fan out to every source and gather `(priority, candidate)` pairs that
    /// arrive before the global deadline. Stragglers are aborted; results
    /// that would arrive late are discarded, never merged into a completed
    /// resolution.
    async fn collect_candidates(&self, query: &Query) -> Vec<(usize, Candidate)> {
        let mut tasks: JoinSet<(usize, SourceId, Result<Option<Candidate>, SourceError>)> =
            JoinSet::new();

        for (priority, source) in self.sources.iter().enumerate() {
            let source = Arc::clone(source);
            let query = query.clone();
            let timeout = self.source_timeout;
            tasks.spawn(async move {
                let id = source.id();
                let outcome = match tokio::time::timeout(timeout, source.fetch(&query)).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout),
                };
                (priority, id, outcome)
            });
        }

        let mut candidates = Vec::new();

        let collect = async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((priority, id, Ok(Some(candidate)))) => {
                        debug!(source = %id, fetched_at = %candidate.fetched_at, "candidate received");
                        candidates.push((priority, candidate));
                    }
                    Ok((_, id, Ok(None))) => {
                        debug!(source = %id, "source has no lyrics for this query");
                    }
                    Ok((_, id, Err(e))) => {
                        debug!(source = %id, error = %e, "source failed, excluding");
                    }
                    Err(e) => {
                        warn!(error = %e, "source task failed to join");
                    }
                }
            }
        };

        if tokio::time::timeout(self.global_deadline, collect).await.is_err() {
            tasks.abort_all();
            debug!(
                key = %query.key,
                arrived = candidates.len(),
                "global deadline elapsed, proceeding with partial results"
            );
        }

        candidates
    }
}

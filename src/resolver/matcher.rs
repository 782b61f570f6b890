//! Candidate scoring and winner selection.
//!
//! Similarity is computed over normalized strings (see `normalize`), so
//! casing, diacritics, and decoration tags never count against a match.
//! Title similarity is weighted above artist similarity: a wrong title is
//! more disqualifying than a differently-credited artist.
//!
//! Selection is deterministic: highest score wins, and an exact score tie
//! goes to the source with the lowest configured priority index. Network
//! arrival order never influences the outcome, so a resolution is
//! reproducible under jitter.

use std::collections::HashSet;

use crate::config::MatcherConfig;
use crate::normalize;

use super::domain::{Candidate, Query};

/// Scores candidates against a query and picks the winner.
#[derive(Debug, Clone)]
pub struct Matcher {
    accept_threshold: f64,
    title_weight: f64,
    artist_weight: f64,
}

impl Matcher {
    pub fn new(config: &MatcherConfig) -> Self {
        Self {
            accept_threshold: config.accept_threshold,
            title_weight: config.title_weight,
            artist_weight: config.artist_weight,
        }
    }

    /// Combined similarity score in [0, 1].
    ///
    /// An empty query artist acts as a wildcard: the artist component scores
    /// 1.0 and the title has to carry the match on its own.
    pub fn score(&self, query: &Query, candidate: &Candidate) -> f64 {
        let query_title = normalize::normalize_title(&query.title);
        let candidate_title = normalize::normalize_title(&candidate.title);
        let title_sim = strsim::normalized_levenshtein(&query_title, &candidate_title);

        let query_artist = normalize::normalize_artist(&query.artist);
        let artist_sim = if query_artist.is_empty() {
            1.0
        } else {
            let candidate_artist = normalize::normalize_artist(&candidate.artist);
            artist_similarity(&query_artist, &candidate_artist)
        };

        let total = self.title_weight + self.artist_weight;
        (self.title_weight * title_sim + self.artist_weight * artist_sim) / total
    }

    /// Whether a score clears the acceptance threshold.
    pub fn accepts(&self, score: f64) -> bool {
        score >= self.accept_threshold
    }

    /// Pick the winning candidate from `(priority, candidate)` pairs.
    ///
    /// Candidates below the threshold are rejected outright regardless of
    /// relative ranking. Among the accepted: highest score first, then lowest
    /// priority index. Returns the winner and its score.
    pub fn select(
        &self,
        query: &Query,
        candidates: Vec<(usize, Candidate)>,
    ) -> Option<(Candidate, f64)> {
        candidates
            .into_iter()
            .map(|(priority, candidate)| {
                let score = self.score(query, &candidate);
                (priority, candidate, score)
            })
            .filter(|(_, _, score)| self.accepts(*score))
            .min_by(|(pa, _, sa), (pb, _, sb)| {
                // Highest score first; ties broken by configured priority
                sb.total_cmp(sa).then(pa.cmp(pb))
            })
            .map(|(_, candidate, score)| (candidate, score))
    }
}

/// Artist similarity: best of edit-distance ratio, word-token overlap, and
/// primary-credit comparison.
///
/// A track credited to "queen and david bowie" should still match a query
/// for "queen"; plain edit distance is harsh on the extra credits.
fn artist_similarity(a: &str, b: &str) -> f64 {
    let mut sim = strsim::normalized_levenshtein(a, b).max(token_jaccard(a, b));

    let primary_a = normalize::extract_primary_artist(a);
    let primary_b = normalize::extract_primary_artist(b);
    if primary_a.is_some() || primary_b.is_some() {
        let pa = primary_a.as_deref().unwrap_or(a);
        let pb = primary_b.as_deref().unwrap_or(b);
        sim = sim.max(strsim::normalized_levenshtein(pa, pb));
    }

    sim
}

/// Jaccard similarity over whitespace-separated word tokens.
fn token_jaccard(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    intersection as f64 / union as f64
}

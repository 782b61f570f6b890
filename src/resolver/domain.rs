//! Internal domain models for lyrics resolution.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All provider responses get converted into these types via adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize;

/// Which external lyrics source produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceId {
    Lrclib,
    LyricsOvh,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Lrclib => "lrclib",
            SourceId::LyricsOvh => "lyrics_ovh",
        }
    }

    /// Parse a config provider name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lrclib" => Some(SourceId::Lrclib),
            "lyrics_ovh" | "lyrics.ovh" => Some(SourceId::LyricsOvh),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lyrics lookup request. Immutable once constructed; `key` is derived
/// deterministically from artist + title.
#[derive(Debug, Clone)]
pub struct Query {
    pub artist: String,
    pub title: String,
    pub key: String,
}

impl Query {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        let artist = artist.into();
        let title = title.into();
        let key = normalize::cache_key(&artist, &title);
        Self { artist, title, key }
    }
}

/// One provider's raw returned metadata + lyrics for a query, pre-scoring.
/// Owned transiently by the resolver during one resolution.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source: SourceId,
    pub artist: String,
    pub title: String,
    pub lyrics: String,
    pub fetched_at: DateTime<Utc>,
}

/// A resolved, scored lyrics match - the unit stored in the cache.
/// Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsResult {
    pub key: String,
    pub lyrics: String,
    pub source: SourceId,
    pub score: f64,
    pub resolved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of one resolution as seen by callers of the engine.
/// "No lyrics found" is a value, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LyricsResolution {
    Found(LyricsResult),
    NotFound,
}

impl LyricsResolution {
    pub fn found(&self) -> Option<&LyricsResult> {
        match self {
            LyricsResolution::Found(result) => Some(result),
            LyricsResolution::NotFound => None,
        }
    }
}

/// Errors a single provider fetch can produce. These are absorbed at the
/// resolver boundary: a failing source is excluded from the candidate set,
/// never fatal to the resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,

    #[error("rate limited - try again later")]
    RateLimited,

    #[error("source unreachable: {0}")]
    Unreachable(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_key_ignores_formatting() {
        let a = Query::new("The Beatles", "Let It Be");
        let b = Query::new("the beatles", "let it be");
        assert_eq!(a.key, b.key);
        assert_eq!(a.artist, "The Beatles"); // original strings preserved
    }

    #[test]
    fn test_source_id_roundtrip() {
        for id in [SourceId::Lrclib, SourceId::LyricsOvh] {
            assert_eq!(SourceId::from_name(id.as_str()), Some(id));
        }
        assert_eq!(SourceId::from_name("genius"), None);
    }

    #[test]
    fn test_resolution_accessor() {
        assert!(LyricsResolution::NotFound.found().is_none());
    }
}

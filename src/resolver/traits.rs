//! Trait definition for external lyrics sources.
//!
//! This trait enables dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! substitute mock implementations.

use async_trait::async_trait;

use super::domain::{Candidate, Query, SourceError, SourceId};

/// A single external lyrics source.
///
/// `fetch` returns zero-or-one best-effort candidate for the query.
/// Implementations should be polite (set timeouts on their HTTP clients),
/// but the resolver enforces its own timeout externally and does not trust
/// an adapter to honor one.
#[async_trait]
pub trait LyricsSource: Send + Sync {
    /// Stable identifier, used for logging and result attribution.
    fn id(&self) -> SourceId;

    /// Fetch lyrics for a query. `Ok(None)` means the source answered but
    /// has no lyrics for this song.
    async fn fetch(&self, query: &Query) -> Result<Option<Candidate>, SourceError>;
}

#[async_trait]
impl LyricsSource for super::lrclib::LrclibClient {
    fn id(&self) -> SourceId {
        SourceId::Lrclib
    }

    async fn fetch(&self, query: &Query) -> Result<Option<Candidate>, SourceError> {
        self.fetch(query).await
    }
}

#[async_trait]
impl LyricsSource for super::ovh::LyricsOvhClient {
    fn id(&self) -> SourceId {
        SourceId::LyricsOvh
    }

    async fn fetch(&self, query: &Query) -> Result<Option<Candidate>, SourceError> {
        self.fetch(query).await
    }
}

/// Mock sources for testing.
///
/// Return configurable candidates, errors, or artificial delays so tests
/// can exercise scoring, tie-breaking, and deadline behavior without the
/// network.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock source that returns a predefined candidate after an optional
    /// delay, and counts how many times it was called.
    pub struct MockSource {
        pub source: SourceId,
        pub candidate: Option<(String, String, String)>, // artist, title, lyrics
        pub error: Option<SourceError>,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        /// A source that returns a single candidate echoing the given metadata.
        pub fn returning(source: SourceId, artist: &str, title: &str, lyrics: &str) -> Self {
            Self {
                source,
                candidate: Some((artist.to_string(), title.to_string(), lyrics.to_string())),
                error: None,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// A source that answers "no lyrics here".
        pub fn empty(source: SourceId) -> Self {
            Self {
                source,
                candidate: None,
                error: None,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// A source that fails with the given error.
        pub fn failing(source: SourceId, error: SourceError) -> Self {
            Self {
                source,
                candidate: None,
                error: Some(error),
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Delay the response; used to exercise timeouts and deadlines.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Share the call counter before handing the mock to the resolver.
        pub fn call_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl LyricsSource for MockSource {
        fn id(&self) -> SourceId {
            self.source
        }

        async fn fetch(&self, _query: &Query) -> Result<Option<Candidate>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref err) = self.error {
                return Err(err.clone());
            }

            Ok(self.candidate.as_ref().map(|(artist, title, lyrics)| Candidate {
                source: self.source,
                artist: artist.clone(),
                title: title.clone(),
                lyrics: lyrics.clone(),
                fetched_at: Utc::now(),
            }))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_returns_candidate() {
            let mock = MockSource::returning(SourceId::Lrclib, "Queen", "Under Pressure", "text");
            let query = Query::new("Queen", "Under Pressure");
            let candidate = mock.fetch(&query).await.unwrap().unwrap();
            assert_eq!(candidate.source, SourceId::Lrclib);
            assert_eq!(candidate.lyrics, "text");
            assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_mock_error() {
            let mock = MockSource::failing(SourceId::LyricsOvh, SourceError::RateLimited);
            let query = Query::new("a", "b");
            let result = mock.fetch(&query).await;
            assert!(matches!(result, Err(SourceError::RateLimited)));
        }

        #[tokio::test]
        async fn test_mock_empty() {
            let mock = MockSource::empty(SourceId::Lrclib);
            let query = Query::new("a", "b");
            assert!(mock.fetch(&query).await.unwrap().is_none());
        }
    }
}

//! LRCLIB HTTP client
//!
//! Handles communication with the LRCLIB API.
//! See: https://lrclib.net/docs
//!
//! LRCLIB asks API consumers to send an identifying User-Agent. `/api/get`
//! does an exact signature lookup and 404s on any mismatch, so we fall back
//! to `/api/search` and let the matcher judge what comes back.

use tracing::debug;

use super::{adapter, dto};
use crate::resolver::domain::{Candidate, Query, SourceError};

/// LRCLIB API client
pub struct LrclibClient {
    http_client: reqwest::Client,
    base_url: String,
}

/// User agent string - LRCLIB asks clients to identify themselves
const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/lyrics-api)"
);

impl LrclibClient {
    /// Create a new client
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: "https://lrclib.net/api".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Fetch the best available lyrics record for a query.
    pub async fn fetch(&self, query: &Query) -> Result<Option<Candidate>, SourceError> {
        // Exact lookup first; on a miss, search and take the first usable hit.
        match self.send_get_request(query).await? {
            Some(track) => Ok(adapter::to_candidate(track)),
            None => {
                debug!(key = %query.key, "lrclib get missed, falling back to search");
                let tracks = self.send_search_request(query).await?;
                Ok(tracks.into_iter().find_map(adapter::to_candidate))
            }
        }
    }

    /// GET /api/get - exact signature lookup. `Ok(None)` on 404.
    async fn send_get_request(
        &self,
        query: &Query,
    ) -> Result<Option<dto::TrackResponse>, SourceError> {
        let url = format!(
            "{}/get?artist_name={}&track_name={}",
            self.base_url,
            urlencoding::encode(&query.artist),
            urlencoding::encode(&query.title)
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            // Try to parse error response for a better message
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(SourceError::Unreachable(format!("HTTP {}: {}", status, error.message)));
            }
            return Err(SourceError::Unreachable(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::TrackResponse>()
            .await
            .map(Some)
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }

    /// GET /api/search - fuzzy lookup returning an array of tracks.
    async fn send_search_request(
        &self,
        query: &Query,
    ) -> Result<Vec<dto::TrackResponse>, SourceError> {
        let mut url = format!(
            "{}/search?track_name={}",
            self.base_url,
            urlencoding::encode(&query.title)
        );
        if !query.artist.trim().is_empty() {
            url.push_str(&format!("&artist_name={}", urlencoding::encode(&query.artist)));
        }

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(SourceError::Unreachable(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<Vec<dto::TrackResponse>>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

impl Default for LrclibClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map transport-level reqwest errors onto the source error taxonomy.
fn map_request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Unreachable(e.to_string())
    }
}

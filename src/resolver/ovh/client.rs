//! lyrics.ovh HTTP client
//!
//! Single endpoint: GET https://api.lyrics.ovh/v1/{artist}/{title}.
//! A 404 means "no lyrics for this pair" and is not an error.

use super::{adapter, dto};
use crate::resolver::domain::{Candidate, Query, SourceError};

/// lyrics.ovh API client
pub struct LyricsOvhClient {
    http_client: reqwest::Client,
    base_url: String,
}

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

impl LyricsOvhClient {
    /// Create a new client
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: "https://api.lyrics.ovh/v1".to_string(),
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

    /// Fetch lyrics for the exact (artist, title) pair.
    pub async fn fetch(&self, query: &Query) -> Result<Option<Candidate>, SourceError> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(&query.artist),
            urlencoding::encode(&query.title)
        );

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Unreachable(e.to_string())
            }
        })?;

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
                return Err(SourceError::Unreachable(format!("HTTP {}: {}", status, error.error)));
            }
            return Err(SourceError::Unreachable(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .json::<dto::LyricsResponse>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        Ok(adapter::to_candidate(query, body))
    }
}

impl Default for LyricsOvhClient {
    fn default() -> Self {
        Self::new()
    }
}

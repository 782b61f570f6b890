//! lyrics.ovh API Data Transfer Objects
//!
//! These types match EXACTLY what the lyrics.ovh API returns.
//! DO NOT use these types outside the ovh module - convert to domain types.
//!
//! Endpoint: GET https://api.lyrics.ovh/v1/{artist}/{title}
//! Success body is `{"lyrics": "..."}`; a miss is a 404 with
//! `{"error": "No lyrics found"}`.

use serde::{Deserialize, Serialize};

/// Lyrics response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LyricsResponse {
    #[serde(default)]
    pub lyrics: Option<String>,
}

/// Error response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: String,
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

//! LRCLIB API Data Transfer Objects
//!
//! These types match EXACTLY what the LRCLIB API returns.
//! DO NOT use these types outside the lrclib module - convert to domain types.
//!
//! API Reference: https://lrclib.net/docs
//!
//! We use the /api/get endpoint for an exact signature lookup and fall back
//! to /api/search when it 404s.

use serde::{Deserialize, Serialize};

/// A track record from /api/get or an element of the /api/search array.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    /// Track title as LRCLIB has it
    #[serde(default)]
    pub track_name: String,
    /// Artist credit as LRCLIB has it
    #[serde(default)]
    pub artist_name: String,
    /// Album title
    #[serde(default)]
    pub album_name: String,
    /// Track duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// True for instrumental tracks (no lyrics by definition)
    #[serde(default)]
    pub instrumental: bool,
    /// Unsynced lyrics text
    #[serde(default)]
    pub plain_lyrics: Option<String>,
    /// LRC-format synced lyrics
    #[serde(default)]
    pub synced_lyrics: Option<String>,
}

/// Error response body (e.g. on 404)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_get_response() {
        let json = r#"{
            "id": 3396226,
            "trackName": "Let It Be",
            "artistName": "The Beatles",
            "albumName": "Let It Be",
            "duration": 243.0,
            "instrumental": false,
            "plainLyrics": "When I find myself in times of trouble...",
            "syncedLyrics": "[00:13.10] When I find myself in times of trouble..."
        }"#;

        let track: TrackResponse = serde_json::from_str(json).expect("Should parse get response");

        assert_eq!(track.track_name, "Let It Be");
        assert_eq!(track.artist_name, "The Beatles");
        assert_eq!(track.duration, Some(243.0));
        assert!(!track.instrumental);
        assert!(track.plain_lyrics.as_deref().unwrap().starts_with("When I find"));
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"[
            {
                "trackName": "Yesterday",
                "artistName": "The Beatles",
                "albumName": "Help!",
                "plainLyrics": "Yesterday, all my troubles seemed so far away"
            },
            {
                "trackName": "Yesterday",
                "artistName": "Beatles Tribute Band",
                "albumName": "Karaoke Hits",
                "plainLyrics": null
            }
        ]"#;

        let tracks: Vec<TrackResponse> =
            serde_json::from_str(json).expect("Should parse search response");

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].album_name, "Help!");
        assert!(tracks[1].plain_lyrics.is_none());
    }

    #[test]
    fn test_parse_instrumental() {
        let json = r#"{
            "trackName": "Frankenstein",
            "artistName": "The Edgar Winter Group",
            "instrumental": true,
            "plainLyrics": null,
            "syncedLyrics": null
        }"#;

        let track: TrackResponse = serde_json::from_str(json).expect("Should parse instrumental");
        assert!(track.instrumental);
        assert!(track.plain_lyrics.is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "statusCode": 404,
            "name": "TrackNotFound",
            "message": "Failed to find specified track"
        }"#;

        let error: ApiError = serde_json::from_str(json).expect("Should parse error");
        assert!(error.message.contains("Failed to find"));
    }
}

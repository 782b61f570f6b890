//! Adapter layer: Convert lyrics.ovh DTOs to domain models
//!
//! lyrics.ovh echoes no track metadata, so the candidate carries the query's
//! own artist/title - the API only answers for the exact pair it was asked,
//! which the matcher then treats as an exact metadata match.

use chrono::Utc;

use super::dto;
use crate::resolver::domain::{Candidate, Query, SourceId};

/// Convert a lyrics.ovh response into a candidate for the given query.
pub fn to_candidate(query: &Query, response: dto::LyricsResponse) -> Option<Candidate> {
    let lyrics = response.lyrics?;
    let trimmed = lyrics.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(Candidate {
        source: SourceId::LyricsOvh,
        artist: query.artist.clone(),
        title: query.title.clone(),
        lyrics: trimmed.to_string(),
        fetched_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_echoes_query_metadata() {
        let query = Query::new("The Beatles", "Let It Be");
        let response = dto::LyricsResponse {
            lyrics: Some("When I find myself in times of trouble".to_string()),
        };

        let candidate = to_candidate(&query, response).unwrap();
        assert_eq!(candidate.artist, "The Beatles");
        assert_eq!(candidate.title, "Let It Be");
        assert_eq!(candidate.source, SourceId::LyricsOvh);
    }

    #[test]
    fn test_empty_lyrics_is_no_candidate() {
        let query = Query::new("a", "b");
        assert!(to_candidate(&query, dto::LyricsResponse { lyrics: None }).is_none());
        assert!(
            to_candidate(
                &query,
                dto::LyricsResponse {
                    lyrics: Some("  \n ".to_string())
                }
            )
            .is_none()
        );
    }
}

//! Adapter layer: Convert LRCLIB DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! If LRCLIB changes their response format, only this file and dto.rs need
//! to change.

use chrono::Utc;

use super::dto;
use crate::resolver::domain::{Candidate, SourceId};

/// Convert an LRCLIB track response into a candidate.
///
/// Prefers plain lyrics; falls back to synced lyrics with the LRC timestamps
/// stripped. Instrumentals and empty records yield no candidate.
pub fn to_candidate(response: dto::TrackResponse) -> Option<Candidate> {
    if response.instrumental {
        return None;
    }

    let lyrics = response
        .plain_lyrics
        .filter(|text| !text.trim().is_empty())
        .or_else(|| {
            response
                .synced_lyrics
                .map(|synced| strip_lrc_timestamps(&synced))
                .filter(|text| !text.trim().is_empty())
        })?;

    Some(Candidate {
        source: SourceId::Lrclib,
        artist: response.artist_name,
        title: response.track_name,
        lyrics,
        fetched_at: Utc::now(),
    })
}

/// Drop `[mm:ss.xx]` timestamp prefixes and LRC metadata lines, keeping the
/// bare text.
fn strip_lrc_timestamps(synced: &str) -> String {
    synced
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            // Timestamped line: take the text after the last closing bracket.
            // Metadata lines like [ar: Artist] have no text after it - skipped.
            match trimmed.rfind(']') {
                Some(pos) => {
                    let text = trimmed[pos + 1..].trim();
                    (!text.is_empty()).then(|| text.to_string())
                }
                None => Some(trimmed.to_string()),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Query normalization - canonical keys for cache and matching identity.
//!
//! Raw artist/title strings arrive in wildly inconsistent shapes: casing,
//! diacritics, curly quotes, "feat." credits, "(Remastered 2011)" suffixes.
//! Everything here is pure and total: normalization never fails, and two
//! strings that differ only in formatting map to the same key.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Separator between the artist and title segments of a cache key.
/// An empty artist leaves an empty leading segment (wildcard).
const KEY_SEPARATOR: &str = "::";

/// Title decoration patterns (applied in order).
static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Remaster variants: "- Remastered 2011", "(2011 Remaster)"
        Regex::new(r"(?i)\s*[-–—/]\s*(?:\d{4}\s+)?remaster(?:ed)?(?:\s+\d{4})?\s*$").unwrap(),
        Regex::new(r"(?i)\s*[\(\[](?:\d{4}\s+)?remaster(?:ed)?(?:\s+\d{4})?[\)\]]").unwrap(),
        // Live/acoustic: "(Live at Wembley)", "- Acoustic Version"
        Regex::new(r"(?i)\s*[\(\[](?:live(?:\s+(?:at|from|in)\s+[^)\]]+)?|acoustic(?:\s+version)?|unplugged)[\)\]]").unwrap(),
        Regex::new(r"(?i)\s*[-–—]\s*(?:live(?:\s+(?:at|from|in)\s+.+)?|acoustic(?:\s+version)?)\s*$").unwrap(),
        // Mix/version variants: "(Radio Edit)", "[Album Version]", "(Mono)"
        Regex::new(r"(?i)\s*[\(\[](?:radio\s+edit|single\s+version|album\s+version|extended(?:\s+(?:mix|version))?|original\s+mix|mono|stereo)[\)\]]").unwrap(),
        // Content variants: "(Explicit)", "[Clean]", "(Instrumental)"
        Regex::new(r"(?i)\s*[\(\[](?:explicit|clean|censored|instrumental|karaoke)[\)\]]").unwrap(),
        // Remix attribution: "(Artist Remix)", "- Someone Remix"
        Regex::new(r"(?i)\s*[\(\[][^)\]]*remix[\)\]]").unwrap(),
        Regex::new(r"(?i)\s*[-–—]\s*[\w\s]+\s+(?:remix|mix|edit)\s*$").unwrap(),
        // Featured artists: "(feat. Artist)", "[ft. Someone]", trailing "feat. X"
        Regex::new(r"(?i)\s*[\(\[](?:feat\.?|ft\.?|featuring)\s+[^)\]]+[\)\]]").unwrap(),
        Regex::new(r"(?i)\s+(?:feat\.?|ft\.?|featuring)\s+.+$").unwrap(),
    ]
});

/// Artist cleanup patterns: strip featured/joined credits.
static ARTIST_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(r"(?i)\s+(?:feat\.?|ft\.?|featuring|with)\s+.*$").unwrap()]
});

/// Collapse runs of whitespace into a single space.
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Multi-artist separators: &, /, comma, plus, " x ", " vs ", " and ", " with ".
static ARTIST_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:[&/,+]|\s(?:x|vs\.?|and|with)\s)\s*").unwrap());

/// Check if a character is a Unicode combining mark (diacritical mark).
/// Used to filter out accents during normalization.
fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Fold text to a lowercase, diacritic-free form via NFKD decomposition.
/// e.g., "Beyoncé" → "beyonce", "naïve" → "naive"
/// Pattern stripping can leave doubled spaces behind, so runs are collapsed
/// here as the final step.
fn fold_ascii(s: &str) -> String {
    let folded = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    MULTI_SPACE.replace_all(&folded, " ").to_string()
}

/// Normalize punctuation: straighten curly quotes, unify ampersands.
fn normalize_punctuation(s: &str) -> String {
    let result = s
        .replace(['\u{2018}', '\u{2019}', '\u{00B4}', '\u{0060}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(" & ", " and ");
    MULTI_SPACE.replace_all(&result, " ").to_string()
}

/// Normalize an artist name for matching.
/// Strips featured credits and the "The" prefix/suffix, folds diacritics.
pub fn normalize_artist(artist: &str) -> String {
    let mut result = normalize_punctuation(artist);
    for pattern in ARTIST_PATTERNS.iter() {
        result = pattern.replace_all(&result, "").to_string();
    }

    let mut normalized = fold_ascii(&result).trim().to_string();

    // Strip "the " prefix (e.g., "The Beatles" → "beatles")
    while normalized.starts_with("the ") {
        normalized = normalized[4..].trim_start().to_string();
    }
    // Strip ", the" suffix (e.g., "Scorpions, The" → "scorpions")
    while normalized.ends_with(", the") {
        normalized = normalized[..normalized.len() - 5].trim_end().to_string();
    }

    normalized.trim().to_string()
}

/// Normalize a track title for matching.
/// Strips decorations (remaster/live/feat/remix tags), folds diacritics.
pub fn normalize_title(title: &str) -> String {
    let mut result = normalize_punctuation(title);
    for pattern in TITLE_PATTERNS.iter() {
        result = pattern.replace_all(&result, "").to_string();
    }

    fold_ascii(&result).trim().to_string()
}

/// Extract the primary (first-credited) artist from a normalized
/// multi-artist string.
/// e.g., "queen and david bowie" → Some("queen"). Returns None when no
/// separator is present or the prefix is too short to be a name.
pub fn extract_primary_artist(artist_norm: &str) -> Option<String> {
    let m = ARTIST_SEPARATOR.find(artist_norm)?;
    let primary = artist_norm[..m.start()].trim();
    if primary.len() >= 2 {
        Some(primary.to_string())
    } else {
        None
    }
}

/// Derive the cache key for an (artist, title) pair.
///
/// Pure function of its inputs: formatting, casing, and diacritic variants
/// of the same song collapse to the same key. An empty artist produces an
/// empty leading segment, so title-only lookups still get a stable slot.
pub fn cache_key(artist: &str, title: &str) -> String {
    format!(
        "{}{}{}",
        normalize_artist(artist),
        KEY_SEPARATOR,
        normalize_title(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_variants_same_key() {
        assert_eq!(
            cache_key("The Beatles", "Let It Be"),
            cache_key("the beatles", "LET IT BE")
        );
    }

    #[test]
    fn test_diacritics_fold() {
        assert_eq!(normalize_artist("Beyoncé"), "beyonce");
        assert_eq!(normalize_title("Déjà Vu"), "deja vu");
    }

    #[test]
    fn test_the_prefix_stripped() {
        assert_eq!(normalize_artist("The Beatles"), "beatles");
        assert_eq!(normalize_artist("Scorpions, The"), "scorpions");
    }

    #[test]
    fn test_feat_credit_stripped() {
        assert_eq!(
            normalize_title("Airplanes (feat. Hayley Williams)"),
            normalize_title("Airplanes")
        );
        assert_eq!(
            normalize_artist("B.o.B feat. Hayley Williams"),
            normalize_artist("B.o.B")
        );
    }

    #[test]
    fn test_remaster_tag_stripped() {
        assert_eq!(
            normalize_title("Come Together - Remastered 2009"),
            "come together"
        );
        assert_eq!(normalize_title("Come Together (2009 Remaster)"), "come together");
    }

    #[test]
    fn test_live_and_remix_stripped() {
        assert_eq!(normalize_title("One (Live at Wembley)"), "one");
        assert_eq!(normalize_title("Blue Monday (Hardfloor Remix)"), "blue monday");
    }

    #[test]
    fn test_curly_quotes_and_ampersand() {
        assert_eq!(normalize_title("Don\u{2019}t Stop"), "don't stop");
        assert_eq!(normalize_artist("Simon & Garfunkel"), "simon and garfunkel");
    }

    #[test]
    fn test_empty_artist_is_wildcard_segment() {
        let key = cache_key("", "Yesterday");
        assert!(key.starts_with(KEY_SEPARATOR));
        assert_eq!(key, format!("{}yesterday", KEY_SEPARATOR));
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_artist("Daft   Punk"), "daft punk");
    }

    #[test]
    fn test_extract_primary_artist() {
        assert_eq!(
            extract_primary_artist("queen and david bowie").as_deref(),
            Some("queen")
        );
        assert_eq!(
            extract_primary_artist("mustard, migos").as_deref(),
            Some("mustard")
        );
        assert_eq!(extract_primary_artist("beatles"), None);
    }

    proptest! {
        /// Normalization is idempotent: re-normalizing a normalized string
        /// is a no-op.
        #[test]
        fn prop_normalize_idempotent(artist in "[a-zA-Z0-9' ]{0,40}", title in "[a-zA-Z0-9' ]{0,40}") {
            let a = normalize_artist(&artist);
            let t = normalize_title(&title);
            prop_assert_eq!(normalize_artist(&a), a.clone());
            prop_assert_eq!(normalize_title(&t), t.clone());
        }

        /// Keys never panic on arbitrary input.
        #[test]
        fn prop_cache_key_total(artist in ".{0,60}", title in ".{0,60}") {
            let _ = cache_key(&artist, &title);
        }
    }
}

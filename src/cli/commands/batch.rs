//! Batch lyrics lookup command.
//!
//! Reads "Artist - Title" lines and resolves them concurrently. Queries for
//! the same song coalesce into one fan-out; distinct songs resolve in
//! parallel.

use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::resolver::LyricsResolution;

use super::build_service;

/// Resolve every query line of a file and print a summary.
pub fn cmd_batch(
    rt: &Runtime,
    config: &Config,
    file: &Path,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let queries: Vec<(String, String)> = contents
        .lines()
        .filter_map(parse_query_line)
        .collect();

    if queries.is_empty() {
        eprintln!("No \"Artist - Title\" lines found in {:?}", file);
        std::process::exit(1);
    }

    rt.block_on(async {
        let service = match build_service(config, db).await {
            Ok(service) => Arc::new(service),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        };

        let tasks = queries.iter().map(|(artist, title)| {
            let service = Arc::clone(&service);
            async move { service.resolve(artist, title).await }
        });
        let results = futures::future::join_all(tasks).await;

        let mut found = 0;
        for ((artist, title), resolution) in queries.iter().zip(&results) {
            match resolution {
                LyricsResolution::Found(result) => {
                    found += 1;
                    println!("✓ {} - {} ({})", artist, title, result.source);
                }
                LyricsResolution::NotFound => {
                    println!("✗ {} - {}", artist, title);
                }
            }
        }

        let stats = service.cache_stats();
        println!();
        println!(
            "{}/{} resolved ({} cached entries, {:.0}% hit rate)",
            found,
            results.len(),
            stats.entries,
            stats.hit_rate() * 100.0
        );
    });
    Ok(())
}

/// Parse an "Artist - Title" line. Lines without a separator become
/// title-only queries; blank lines and # comments are skipped.
fn parse_query_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    match trimmed.split_once(" - ") {
        Some((artist, title)) => Some((artist.trim().to_string(), title.trim().to_string())),
        None => Some((String::new(), trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_artist_title_line() {
        assert_eq!(
            parse_query_line("The Beatles - Let It Be"),
            Some(("The Beatles".to_string(), "Let It Be".to_string()))
        );
    }

    #[test]
    fn test_parse_title_only_line() {
        assert_eq!(
            parse_query_line("Bohemian Rhapsody"),
            Some((String::new(), "Bohemian Rhapsody".to_string()))
        );
    }

    #[test]
    fn test_skips_blanks_and_comments() {
        assert_eq!(parse_query_line("   "), None);
        assert_eq!(parse_query_line("# a comment"), None);
    }
}

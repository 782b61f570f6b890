//! Single-song lyrics lookup command.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::resolver::LyricsResolution;

use super::build_service;

/// Resolve and print lyrics for one (artist, title) pair.
pub fn cmd_lookup(
    rt: &Runtime,
    config: &Config,
    artist: &str,
    title: &str,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = match build_service(config, db).await {
            Ok(service) => service,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        };

        match service.resolve(artist, title).await {
            LyricsResolution::Found(result) => {
                println!(
                    "✓ {} - {} (source: {}, confidence: {:.0}%)",
                    artist,
                    title,
                    result.source,
                    result.score * 100.0
                );
                println!();
                println!("{}", result.lyrics);
            }
            LyricsResolution::NotFound => {
                println!("✗ No lyrics found for {} - {}", artist, title);
                std::process::exit(1);
            }
        }
    });
    Ok(())
}

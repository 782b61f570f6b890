//! Persistent cache maintenance and configuration inspection commands.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::resolver::SourceId;
use crate::storage::{LyricsStore, SqliteStore};

/// Delete expired rows from the SQLite cache.
pub fn cmd_sweep(rt: &Runtime, config: &Config, db: Option<&Path>) -> anyhow::Result<()> {
    let Some(db_path) = db.map(Path::to_path_buf).or_else(|| config.storage.db_path.clone())
    else {
        eprintln!("Error: no database configured.");
        eprintln!("Set [storage] db_path in the config file or pass --db PATH");
        std::process::exit(1);
    };

    rt.block_on(async {
        match SqliteStore::open(&db_path).await {
            Ok(store) => match store.purge_expired().await {
                Ok(purged) => println!("✓ Removed {} expired entries from {:?}", purged, db_path),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(2);
                }
            },
            Err(e) => {
                eprintln!("Error opening {:?}: {e}", db_path);
                std::process::exit(2);
            }
        }
    });
    Ok(())
}

/// Write a default config file for editing.
pub fn cmd_init_config() -> anyhow::Result<()> {
    let config = Config::default();
    crate::config::save(&config)?;
    match crate::config::config_path() {
        Some(path) => println!("✓ Wrote default config to {:?}", path),
        None => println!("✓ Wrote default config"),
    }
    Ok(())
}

/// List configured providers in priority order.
pub fn cmd_providers(config: &Config) -> anyhow::Result<()> {
    println!("Configured providers (priority order):");
    for (priority, name) in config.providers.enabled.iter().enumerate() {
        match SourceId::from_name(name) {
            Some(id) => println!("  {}. {}", priority + 1, id),
            None => println!("  {}. {} (unknown - will be rejected at startup)", priority + 1, name),
        }
    }

    println!();
    println!(
        "Threshold: {:.2}  TTLs: {}s positive / {}s negative",
        config.matcher.accept_threshold,
        config.cache.positive_ttl_secs,
        config.cache.negative_ttl_secs
    );
    Ok(())
}

//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `lookup`: Resolve lyrics for a single (artist, title) pair
//! - `batch`: Resolve a file of queries concurrently
//! - `maintain`: Persistent store sweeping and provider listing

mod batch;
mod lookup;
mod maintain;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::service::LyricsService;
use crate::storage::{LyricsStore, SqliteStore};

pub use batch::cmd_batch;
pub use lookup::cmd_lookup;
pub use maintain::{cmd_init_config, cmd_providers, cmd_sweep};

/// Lyrics resolution engine CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (default: OS config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve lyrics for one song
    Lookup {
        /// Artist name (empty string matches on title alone)
        artist: String,
        /// Track title
        title: String,
        /// SQLite cache path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Resolve every "Artist - Title" line of a file
    Batch {
        /// Path to the query file
        file: PathBuf,
        /// SQLite cache path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Delete expired rows from the persistent cache
    Sweep {
        /// SQLite cache path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List configured providers in priority order
    Providers,
    /// Write a default config file to the OS config directory
    InitConfig,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Lookup { artist, title, db } => {
            cmd_lookup(&rt, &config, artist, title, db.as_deref())
        }
        Commands::Batch { file, db } => cmd_batch(&rt, &config, file, db.as_deref()),
        Commands::Sweep { db } => cmd_sweep(&rt, &config, db.as_deref()),
        Commands::Providers => cmd_providers(&config),
        Commands::InitConfig => cmd_init_config(),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Build the engine, opening the SQLite tier when a path is configured.
pub(crate) async fn build_service(
    config: &Config,
    db_override: Option<&std::path::Path>,
) -> anyhow::Result<LyricsService> {
    let db_path = db_override
        .map(PathBuf::from)
        .or_else(|| config.storage.db_path.clone());

    let store: Option<Arc<dyn LyricsStore>> = match db_path {
        Some(path) => Some(Arc::new(SqliteStore::open(&path).await?)),
        None => None,
    };

    Ok(LyricsService::new(config, store)?)
}

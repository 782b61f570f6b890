//! lyrics-api - a lyrics resolution and caching engine.
//!
//! Takes an (artist, title) query, fans out to external lyrics sources
//! concurrently, scores the candidates, and caches the winner so repeated
//! queries never re-fetch. Driven from the command line; see `cli` for the
//! available commands.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod normalize;
pub mod resolver;
pub mod service;
pub mod storage;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("lyrics_api=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}

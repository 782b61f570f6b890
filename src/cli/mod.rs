//! Command-line interface for lyrics-api.
//!
//! This module provides CLI commands for resolving lyrics, batch lookups,
//! and maintaining the persistent cache.

mod commands;

pub use commands::{Cli, Commands, run_command};

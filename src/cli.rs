//! Command-line interface for the AnimeWatch server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AnimeWatch - Anime Tracking Backend
/// Accounts, watch progress, favorites and achievements over HTTP
#[derive(Parser)]
#[command(name = "animewatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (skips the usual search order)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (the default when no command is given)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tally_core::Category;

/// Daily mouse click and key press counter.
///
/// Keeps a durable per-day total for each input category and renders
/// today's counts as status menu text.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show today's clicks and key presses.
    Status,

    /// Count one event of a category for today.
    Record {
        /// Category to increment (e.g. mouse, key).
        category: Category,
    },

    /// Show every category counted today.
    Today {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Count input events read as JSON lines from stdin.
    Listen,

    /// Print all stored day totals as JSON lines.
    Export,
}

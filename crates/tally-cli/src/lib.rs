//! Daily input tally CLI library.
//!
//! This crate provides the CLI interface for the daily counter store.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;

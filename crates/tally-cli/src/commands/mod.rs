//! CLI subcommand implementations.

pub mod export;
pub mod listen;
pub mod record;
pub mod status;
pub mod today;

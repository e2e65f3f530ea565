//! Where the counter database lives.
//!
//! Settings are layered, later sources winning: built-in defaults, the
//! user's `tally/config.toml`, a file passed with `--config`, then
//! `TALLY_*` environment variables (e.g. `TALLY_DATABASE_PATH`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Name of the per-user directory under the platform config and data roots.
const APP_DIR: &str = "tally";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Counter database file; its directory is created on first open.
    pub database_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("tally.db"),
        }
    }
}

impl Config {
    /// Resolves the configuration, reading `config_path` on top of the
    /// user config file when given.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let user_file = dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"));

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = user_file {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("TALLY_")).extract()
    }
}

/// Per-user data directory holding the counter database.
///
/// On macOS this is `~/Library/Application Support/tally`; on Linux
/// `~/.local/share/tally`.
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR))
}

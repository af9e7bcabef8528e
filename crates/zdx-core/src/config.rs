//! Configuration management for zdx.
//!
//! Loads configuration from `${ZDX_HOME}/config.toml` with sensible
//! defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for zdx's configuration and data directories.
    //!
    //! `ZDX_HOME` resolution order:
    //! 1. `ZDX_HOME` environment variable (if set)
    //! 2. `~/.config/zdx` (default)

    use std::path::PathBuf;

    pub fn zdx_home() -> PathBuf {
        if let Ok(home) = std::env::var("ZDX_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .map(|h| h.join(".config").join("zdx"))
            .expect("could not determine home directory")
    }

    pub fn config_path() -> PathBuf {
        zdx_home().join("config.toml")
    }

    pub fn log_path() -> PathBuf {
        zdx_home().join("logs").join("zdx.log")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interactive() -> bool {
    true
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether to launch the TUI. `false` forces one-shot mode even without
    /// `--prompt`.
    #[serde(default = "default_interactive")]
    pub interactive: bool,

    /// `tracing_subscriber::EnvFilter` directive string.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Caps the number of messages `MessageStore` retains; `None` is
    /// unbounded.
    pub history_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interactive: default_interactive(),
            log_level: default_log_level(),
            history_limit: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config from {}", path.display()))?;
            toml::from_str(&contents).with_context(|| format!("failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/zdx/config.toml")).unwrap();
        assert!(config.interactive);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.interactive);
    }

    #[test]
    fn history_limit_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "history_limit = 200\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.history_limit, Some(200));
    }
}

//! Configuration file loading.
//!
//! TOML file at the platform config dir (or an explicit `--config` path),
//! merged under CLI flags and page parameters. A missing default file yields
//! the built-in defaults; an explicitly named file must exist.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::controller::{ControllerOptions, DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_LEN};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Quiescence interval before a live search fires, in milliseconds.
    pub debounce_ms: u64,
    /// Minimum input length (characters) before a live search is issued.
    pub min_query_len: usize,
    /// Disable to suppress search-as-you-type entirely.
    pub live_search: bool,
    /// Locale overrides; page parameters still win over these.
    pub language: Option<String>,
    pub country: Option<String>,
    /// Path to the shortcut catalog JSON document.
    pub catalog: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            live_search: true,
            language: None,
            country: None,
            catalog: None,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::read(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            min_query_len: self.min_query_len,
            live_search: self.live_search,
        }
    }
}

/// `<config dir>/shortcut-search/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shortcut-search").join("config.toml"))
}

/// `<data dir>/shortcut-search/shortcuts.json`.
pub fn default_catalog_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("shortcut-search").join("shortcuts.json"))
}

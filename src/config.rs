//! Quartermaster configuration.
//!
//! Loaded from `~/.quartermaster/config.toml`. Every key is optional; a
//! missing file means all defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::RefreshPolicy;

const DEFAULT_CATALOG_TTL_SECS: u64 = 300;

/// Quartermaster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Account id for the signed-in store.
    /// Used when neither `--account` nor `QM_ACCOUNT` is set.
    pub account: Option<String>,

    /// Storage root. Defaults to `~/.quartermaster/data`.
    pub data_dir: Option<PathBuf>,

    /// Game data dump to refresh the catalog from.
    pub catalog: Option<PathBuf>,

    /// How long a cached catalog stays fresh.
    pub catalog_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: None,
            data_dir: None,
            catalog: None,
            catalog_ttl_secs: DEFAULT_CATALOG_TTL_SECS,
        }
    }
}

impl Config {
    /// Load config from `~/.quartermaster/config.toml`.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };
        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.quartermaster/config.toml`.
    pub fn path() -> Option<PathBuf> {
        home().map(|h| h.join("config.toml"))
    }

    /// Storage root: `data-dir`, else `~/.quartermaster/data`.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| home().map(|h| h.join("data")))
    }

    /// Where the last good catalog snapshot is cached.
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.data_dir().map(|d| d.join("catalog.json.zst"))
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::from_secs(self.catalog_ttl_secs)
    }
}

fn home() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".quartermaster"))
}

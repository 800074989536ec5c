//! Configuration System
//!
//! File-backed configuration for the cratepack CLI: where crates live,
//! where loads stage their content, and how logging behaves. Resolution
//! order is an explicit `--config` path, then `cratepack.toml` in the
//! working directory, then the user configuration directory.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file name looked up in the standard locations.
pub const CONFIG_FILE_NAME: &str = "cratepack.toml";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CratepackConfig {
    /// Directory scanned for built `.crate` artifacts
    #[serde(default = "default_crates_dir")]
    pub crates_dir: PathBuf,

    /// Root for per-load staging directories (system temp when unset)
    #[serde(default)]
    pub staging_root: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_crates_dir() -> PathBuf {
    PathBuf::from("modules/crates")
}

impl Default for CratepackConfig {
    fn default() -> Self {
        Self {
            crates_dir: default_crates_dir(),
            staging_root: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration file discovery and parsing.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration using the standard resolution order. A missing
    /// file is not an error; defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<CratepackConfig, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::load_from_file(local);
        }

        if let Some(dirs) = ProjectDirs::from("", "", "cratepack") {
            let candidate = dirs.config_dir().join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Self::load_from_file(&candidate);
            }
        }

        Ok(CratepackConfig::default())
    }

    /// Parse a specific configuration file.
    pub fn load_from_file(path: &Path) -> Result<CratepackConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

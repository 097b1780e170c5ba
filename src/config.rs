//! Config module - Manages sqlview configuration (sqlview.toml).
//!
//! Configuration file contains:
//! - Browser settings (page size)
//! - Display settings (cell width in tables)
//! - The most recently opened database file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::navigator::DEFAULT_PAGE_SIZE;

/// Paging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Rows per page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Terminal rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum characters shown per cell in page listings (0 = unlimited)
    #[serde(default = "default_max_cell_width")]
    pub max_cell_width: usize,
}

fn default_max_cell_width() -> usize {
    40
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_cell_width: default_max_cell_width(),
        }
    }
}

/// Main sqlview configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    /// Database opened by the last `browse` session
    #[serde(default)]
    pub recent_file: Option<PathBuf>,
}

/// Get default config directory (~/.config/sqlview/).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("sqlview"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("sqlview.toml")
}

impl Config {
    /// Load config from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Cannot parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Cannot serialize config to TOML")?;

        std::fs::write(path, content)
            .with_context(|| format!("Cannot write config file: {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

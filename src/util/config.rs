//! Configuration file support for jarplan.
//!
//! jarplan supports two configuration file locations:
//! - Global: `~/.jarplan/config.toml` - User-wide defaults
//! - Project: `.jarplan/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::context::ConvertToggles;
use crate::util::fs::read_to_string;

/// jarplan configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Final-format conversion settings
    pub convert: ConvertConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Intermediate output directory, relative to the workspace root
    pub out_dir: Option<PathBuf>,

    /// Install directory, relative to the workspace root
    pub install_dir: Option<PathBuf>,
}

/// Conversion-related configuration.
///
/// These mirror the `JARPLAN_NO_OPTIMIZE` and `JARPLAN_CONVERT_DEBUG`
/// environment toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Disable optimization
    pub no_optimize: bool,

    /// Verbose output and class dump
    pub debug: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if other.build.install_dir.is_some() {
            self.build.install_dir = other.build.install_dir;
        }
        if other.convert.no_optimize {
            self.convert.no_optimize = true;
        }
        if other.convert.debug {
            self.convert.debug = true;
        }
    }

    /// Convert toggles enabled by configuration.
    pub fn toggles(&self) -> ConvertToggles {
        ConvertToggles {
            no_optimize: self.convert.no_optimize,
            debug: self.convert.debug,
        }
    }
}

/// Get the global jarplan config directory (~/.jarplan).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".jarplan"))
}

/// Get the global config path (~/.jarplan/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.jarplan/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".jarplan").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.jarplan/config.toml)
/// 2. Global config (~/.jarplan/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

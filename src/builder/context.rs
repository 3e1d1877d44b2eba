//! Build context - output layout, install layout and environment toggles.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::source_tree::{FsSourceTree, SourceTree};
use crate::core::descriptor::Variant;
use crate::util::config::Config;

/// Disables optimization in the convert stage when set to a non-empty value.
pub const NO_OPTIMIZE_ENV: &str = "JARPLAN_NO_OPTIMIZE";

/// Enables verbose convert output and a class dump when set to a non-empty value.
pub const CONVERT_DEBUG_ENV: &str = "JARPLAN_CONVERT_DEBUG";

/// Archive extension of installed libraries.
pub const ARCHIVE_EXTENSION: &str = "jar";

/// Install category for libraries.
pub const FRAMEWORK_CATEGORY: &str = "framework";

/// Install category for launcher scripts.
pub const BIN_CATEGORY: &str = "bin";

/// Toggles consulted by the final-format convert stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertToggles {
    pub no_optimize: bool,
    pub debug: bool,
}

impl ConvertToggles {
    /// Read the toggles from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the toggles through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = |key: &str| lookup(key).map(|v| !v.is_empty()).unwrap_or(false);
        ConvertToggles {
            no_optimize: enabled(NO_OPTIMIZE_ENV),
            debug: enabled(CONVERT_DEBUG_ENV),
        }
    }

    /// Combine with another set; a toggle is on if either side enables it.
    pub fn or(self, other: ConvertToggles) -> Self {
        ConvertToggles {
            no_optimize: self.no_optimize || other.no_optimize,
            debug: self.debug || other.debug,
        }
    }
}

/// Layout and environment shared by every module of one build.
#[derive(Clone)]
pub struct BuildContext {
    /// Root of intermediate outputs
    pub out_dir: PathBuf,

    /// Root of installed artifacts
    pub install_dir: PathBuf,

    /// Separator used when joining classpath entries
    pub path_separator: char,

    /// Convert stage toggles
    pub toggles: ConvertToggles,

    /// Source file lookups
    pub tree: Arc<dyn SourceTree>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("out_dir", &self.out_dir)
            .field("install_dir", &self.install_dir)
            .field("path_separator", &self.path_separator)
            .field("toggles", &self.toggles)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    /// Create a context with host defaults and no toggles.
    pub fn new(out_dir: impl Into<PathBuf>, install_dir: impl Into<PathBuf>) -> Self {
        BuildContext {
            out_dir: out_dir.into(),
            install_dir: install_dir.into(),
            path_separator: host_path_separator(),
            toggles: ConvertToggles::default(),
            tree: Arc::new(FsSourceTree),
        }
    }

    /// Create a context for a workspace rooted at `root`.
    ///
    /// Directories come from configuration when set; toggles from the
    /// environment and configuration.
    pub fn for_workspace(root: &Path, config: &Config) -> Self {
        let out_dir = config
            .build
            .out_dir
            .as_ref()
            .map(|d| root.join(d))
            .unwrap_or_else(|| root.join("out"));
        let install_dir = config
            .build
            .install_dir
            .as_ref()
            .map(|d| root.join(d))
            .unwrap_or_else(|| out_dir.join("install"));

        BuildContext::new(out_dir, install_dir)
            .with_toggles(ConvertToggles::from_env().or(config.toggles()))
    }

    pub fn with_toggles(mut self, toggles: ConvertToggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn with_tree(mut self, tree: Arc<dyn SourceTree>) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_path_separator(mut self, separator: char) -> Self {
        self.path_separator = separator;
        self
    }

    /// Intermediate output directory of one module variant.
    pub fn module_out_dir(&self, name: &str, variant: Variant) -> PathBuf {
        self.out_dir.join(variant.as_str()).join(name)
    }

    /// Installed location of a file in `category`.
    pub fn install_path(&self, variant: Variant, category: &str, file_name: &str) -> PathBuf {
        self.install_dir
            .join(variant.as_str())
            .join(category)
            .join(file_name)
    }

    /// Join classpath entries with the host separator.
    pub fn join_classpath(&self, entries: &[PathBuf]) -> String {
        entries
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(&self.path_separator.to_string())
    }
}

/// Path-list separator of the host platform.
pub fn host_path_separator() -> char {
    if cfg!(windows) {
        ';'
    } else {
        ':'
    }
}

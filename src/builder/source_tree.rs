//! Access to module source files.
//!
//! The pipeline never touches the filesystem directly; glob expansion and
//! existence checks go through a `SourceTree` so planning can run against
//! an in-memory tree in tests.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs::{glob_files, list_files};

/// Source file lookups needed while planning a module.
pub trait SourceTree: Send + Sync {
    /// Expand source patterns relative to `dir` into concrete files.
    fn expand(&self, dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>>;

    /// List files under `dir`, relative to it.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Whether `path` names an existing file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Source tree backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceTree;

impl SourceTree for FsSourceTree {
    fn expand(&self, dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
        glob_files(dir, patterns)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        list_files(dir)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

//! Test utilities for jarplan unit tests.
//!
//! Provides an in-memory source tree so pipeline tests can run without
//! touching the filesystem, and small builders for common values.

pub mod fixtures;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::source_tree::SourceTree;
use crate::core::capability::ExportedCapability;
use crate::core::jar_spec::JarSpec;
use crate::util::fs::is_glob;

pub use fixtures::*;

/// In-memory source tree.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceTree {
    files: BTreeSet<PathBuf>,
}

impl MemorySourceTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        MemorySourceTree::default()
    }

    /// Add a file.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.insert(path.as_ref().to_path_buf());
        self
    }
}

impl SourceTree for MemorySourceTree {
    fn expand(&self, dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
        let mut results: Vec<PathBuf> = Vec::new();

        for pattern in patterns {
            let full = dir.join(pattern);
            if !is_glob(pattern) {
                if !self.files.contains(&full) {
                    bail!("source file not found: {}", full.display());
                }
                if !results.contains(&full) {
                    results.push(full);
                }
                continue;
            }

            let escaped = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join(pattern);
            let matcher = glob::Pattern::new(&escaped.to_string_lossy())
                .with_context(|| format!("invalid glob pattern: {}", pattern))?;
            let options = glob::MatchOptions {
                require_literal_separator: true,
                ..Default::default()
            };
            for file in &self.files {
                if matcher.matches_path_with(file, options) && !results.contains(file) {
                    results.push(file.clone());
                }
            }
        }

        Ok(results)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let files: Vec<PathBuf> = self
            .files
            .iter()
            .filter_map(|f| f.strip_prefix(dir).ok().map(Path::to_path_buf))
            .collect();
        if files.is_empty() {
            bail!("directory not found: {}", dir.display());
        }
        Ok(files)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}

/// Capability of an already-built library named `name`.
pub fn capability(name: &str, classes: Vec<JarSpec>, resources: Vec<JarSpec>) -> ExportedCapability {
    ExportedCapability::new(
        format!("/out/device/{}/classes-full-debug.jar", name),
        classes,
        resources,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tree_expand() {
        let tree = MemorySourceTree::new()
            .with_file("/m/src/B.java")
            .with_file("/m/src/A.java")
            .with_file("/m/README");

        let files = tree
            .expand(Path::new("/m"), &["src/B.java".to_string(), "src/*.java".to_string()])
            .unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("/m/src/B.java"), PathBuf::from("/m/src/A.java")]
        );
        assert!(tree.expand(Path::new("/m"), &["src/C.java".to_string()]).is_err());
    }

    #[test]
    fn test_memory_tree_list_files() {
        let tree = MemorySourceTree::new().with_file("/m/res/a.txt");
        assert_eq!(
            tree.list_files(Path::new("/m/res")).unwrap(),
            vec![PathBuf::from("a.txt")]
        );
        assert!(tree.list_files(Path::new("/m/assets")).is_err());
    }
}

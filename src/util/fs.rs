//! Filesystem utilities.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Whether a pattern contains glob metacharacters.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Directory part of a source pattern that precedes any glob component.
///
/// Paths of matched files relative to this root are their package paths:
/// `src/**/*.java` has the root `src`. A literal pattern has no glob, so
/// its root is the base directory itself.
pub fn source_root(pattern: &str) -> PathBuf {
    if !is_glob(pattern) {
        return PathBuf::new();
    }

    Path::new(pattern)
        .components()
        .take_while(|c| !is_glob(&c.as_os_str().to_string_lossy()))
        .collect()
}

/// Expand source patterns relative to a base directory.
///
/// Patterns are expanded in order; matches of one glob are sorted. A
/// literal path must name an existing file. Duplicates keep their first
/// position.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);

        if !is_glob(pattern) {
            if !full_pattern.is_file() {
                bail!("source file not found: {}", full_pattern.display());
            }
            if seen.insert(full_pattern.clone()) {
                results.push(full_pattern);
            }
            continue;
        }

        // The base is a real path; only the pattern may carry glob syntax.
        let escaped = Path::new(&glob::Pattern::escape(&base.to_string_lossy())).join(pattern);
        let pattern_str = escaped.to_string_lossy();
        let mut matches = Vec::new();
        for entry in glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))? {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        matches.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }

        matches.sort();
        for path in matches {
            if seen.insert(path.clone()) {
                results.push(path);
            }
        }
    }

    Ok(results)
}

/// List every file below `dir`, relative to it, in sorted order.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("directory not found: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(relative_path(dir, entry.path()));
        }
    }
    Ok(files)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

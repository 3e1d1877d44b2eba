//! Jar specs - named groups of files destined for one archive.
//!
//! A JarSpec records where a group of archive members lives on disk and,
//! where it is known when the plan is made, which archive-relative paths it
//! contributes. When several specs are merged into one archive the earlier
//! spec wins any path collision.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One archive member: its path inside the archive and the file providing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JarEntry {
    /// Archive-relative path, always `/`-separated
    pub path: String,
    /// File on disk providing the member
    pub source: PathBuf,
}

impl JarEntry {
    pub fn new(path: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        JarEntry {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// A named, ordered group of archive members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JarSpec {
    /// Human-readable name (e.g. `app:classes`)
    pub name: String,

    /// Directory the members are rooted at
    pub root: PathBuf,

    /// File listing the members, written by the stage producing this spec
    pub file_list: PathBuf,

    /// Members known when the plan was made
    #[serde(default)]
    pub entries: Vec<JarEntry>,
}

impl JarSpec {
    /// Create a spec rooted at `root` with its file list at `file_list`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, file_list: impl Into<PathBuf>) -> Self {
        JarSpec {
            name: name.into(),
            root: root.into(),
            file_list: file_list.into(),
            entries: Vec::new(),
        }
    }

    /// Add a member, resolving its source under the spec root.
    pub fn with_entry(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let source = self.root.join(&path);
        self.entries.push(JarEntry::new(path, source));
        self
    }

    /// Replace the member list.
    pub fn with_entries(mut self, entries: Vec<JarEntry>) -> Self {
        self.entries = entries;
        self
    }
}

/// Concatenate specs into the member list of one archive.
///
/// Earlier specs win: a path already contributed is skipped when it
/// appears again later.
pub fn merge_entries<'a>(specs: impl IntoIterator<Item = &'a JarSpec>) -> Vec<JarEntry> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::new();

    for spec in specs {
        for entry in &spec.entries {
            if seen.insert(entry.path.as_str()) {
                merged.push(entry.clone());
            } else {
                tracing::debug!(
                    "duplicate archive entry {} from {} ignored",
                    entry.path,
                    spec.name
                );
            }
        }
    }

    merged
}

/// Convert a relative filesystem path into an archive member path.
pub fn archive_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

//! Test fixtures for workspace-level tests.
//!
//! A `WorkspaceFixture` is a real directory holding a `JarPlan.toml` and
//! whatever module files a test needs.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::builder::context::BuildContext;
use crate::ops::workspace::{Workspace, MANIFEST_NAME};
use crate::util::config::Config;

/// A workspace written to a temporary directory.
pub struct WorkspaceFixture {
    dir: TempDir,
}

impl WorkspaceFixture {
    /// Create a workspace with the given manifest content.
    pub fn new(manifest: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_NAME), manifest).unwrap();
        WorkspaceFixture { dir }
    }

    /// Add a file, creating parent directories.
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        self
    }

    /// Workspace root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Load the workspace.
    pub fn workspace(&self) -> Workspace {
        Workspace::load(&self.dir.path().join(MANIFEST_NAME)).unwrap()
    }

    /// Build context with default configuration.
    pub fn context(&self) -> BuildContext {
        BuildContext::for_workspace(self.dir.path(), &Config::default())
    }
}

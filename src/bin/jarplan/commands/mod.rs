//! Command implementations.

pub mod classpath;
pub mod completions;
pub mod deps;
pub mod plan;

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use jarplan::ops::find_manifest;
use jarplan::util::config::{global_config_path, load_config, project_config_path};
use jarplan::util::diagnostic::suggestions;
use jarplan::{BuildContext, Workspace};

/// Locate and load the workspace, and build its context from configuration.
pub fn load_workspace(global: &GlobalArgs) -> Result<(Workspace, BuildContext)> {
    let manifest_path = match &global.manifest_path {
        Some(path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            find_manifest(&cwd).ok_or_else(|| {
                anyhow::anyhow!(
                    "could not find JarPlan.toml in {} or any parent directory\n{}",
                    cwd.display(),
                    suggestions::NO_MANIFEST
                )
            })?
        }
    };

    let ws = Workspace::load(&manifest_path)?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(ws.root()));
    tracing::debug!("config: {:?}", config);

    let ctx = BuildContext::for_workspace(ws.root(), &config);
    Ok((ws, ctx))
}

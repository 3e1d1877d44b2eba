//! High-level operations.
//!
//! This module contains the implementation of jarplan commands.

pub mod plan;
pub mod workspace;

pub use plan::{
    module_dependencies, plan_workspace, DependencyRow, ModuleFailure, PlanOptions, WorkspacePlan,
};
pub use workspace::{find_manifest, ModuleDecl, ModuleInstance, ModuleTypeRegistry, Workspace};

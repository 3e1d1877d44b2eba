//! Module build planning.
//!
//! This module turns collected dependencies into transform stages, install
//! rules and the capability each module publishes.

pub mod binary;
pub mod context;
pub mod pipeline;
pub mod plan;
pub mod prebuilt;
pub mod source_tree;

pub use binary::plan_binary;
pub use context::{BuildContext, ConvertToggles};
pub use pipeline::{build, plan_library, PipelineOutput};
pub use plan::{InstallRule, ModulePlan, PipelineStage, StageKind};
pub use prebuilt::plan_prebuilt;
pub use source_tree::{FsSourceTree, SourceTree};

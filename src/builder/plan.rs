//! Build plan types.
//!
//! A ModulePlan describes the work needed to build one module variant: a
//! strictly linear chain of transform stages plus install rules. The plan
//! is consumed by an external executor; nothing here runs a tool.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::capability::ExportedCapability;
use crate::core::descriptor::Variant;
use crate::core::jar_spec::{merge_entries, JarEntry, JarSpec};

/// The transform a stage performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Compile sources into class files
    Compile,
    /// Package one resource directory
    PackageResources,
    /// Merge class and resource specs into one archive
    Merge,
    /// Rewrite symbol names inside an archive
    Rename,
    /// Convert an archive into the final executable format
    Convert,
    /// Merge the converted payload with resources into the final archive
    FinalMerge,
    /// Split a prebuilt archive into class and resource specs
    ExtractPrebuilt,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Compile => "compile",
            StageKind::PackageResources => "resources",
            StageKind::Merge => "merge",
            StageKind::Rename => "rename",
            StageKind::Convert => "convert",
            StageKind::FinalMerge => "final-merge",
            StageKind::ExtractPrebuilt => "extract",
        }
    }
}

/// One transform in a module's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    /// What the stage does
    pub kind: StageKind,

    /// Files read by the stage
    pub inputs: Vec<PathBuf>,

    /// File or directory written by the stage
    pub output: PathBuf,

    /// Tool flags, space separated
    pub flags: String,

    /// Dependency names whose outputs this stage reads
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Specs merged by this stage, or produced by it
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jar_specs: Vec<JarSpec>,

    /// Manifest embedded by a merge stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

impl PipelineStage {
    pub fn new(kind: StageKind, output: impl Into<PathBuf>) -> Self {
        PipelineStage {
            kind,
            inputs: Vec::new(),
            output: output.into(),
            flags: String::new(),
            depends_on: Vec::new(),
            jar_specs: Vec::new(),
            manifest: None,
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    pub fn with_depends_on(mut self, deps: Vec<String>) -> Self {
        self.depends_on = deps;
        self
    }

    pub fn with_jar_specs(mut self, specs: Vec<JarSpec>) -> Self {
        self.jar_specs = specs;
        self
    }

    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Members of the archive a merge stage writes, earliest spec winning.
    pub fn archive_entries(&self) -> Vec<JarEntry> {
        merge_entries(&self.jar_specs)
    }
}

/// Copy of a built file into the install tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRule {
    /// Install category directory (e.g. `framework`, `bin`)
    pub category: String,

    /// File being installed
    pub source: PathBuf,

    /// Installed location
    pub destination: PathBuf,

    /// Installed file that must exist before this one is considered ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<PathBuf>,
}

/// Everything planned for one module variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePlan {
    /// Module name
    pub name: String,

    /// Module variant
    pub variant: Variant,

    /// Module type (e.g. `library`, `prebuilt`)
    pub module_type: String,

    /// Stages in execution order
    pub stages: Vec<PipelineStage>,

    /// Install rules in execution order
    pub installs: Vec<InstallRule>,

    /// Final artifact of the module
    pub artifact: PathBuf,

    /// Compile classpath, boot entry first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classpath: Vec<PathBuf>,

    /// Capability published to dependents
    pub capability: ExportedCapability,
}

impl ModulePlan {
    /// Kinds of the planned stages, in order.
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind).collect()
    }

    /// First stage of the given kind.
    pub fn stage(&self, kind: StageKind) -> Option<&PipelineStage> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    /// Installed location of the module's archive.
    pub fn installed_artifact(&self) -> Option<&PathBuf> {
        self.installs.first().map(|rule| &rule.destination)
    }
}

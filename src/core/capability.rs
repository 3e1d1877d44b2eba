//! Exported capabilities - what a built module offers its dependents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::jar_spec::JarSpec;

/// The published, read-only result of building one module.
///
/// Only constructed once a module's pipeline has finished, so a value of
/// this type is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedCapability {
    classpath_entry: PathBuf,
    class_jar_specs: Vec<JarSpec>,
    resource_jar_specs: Vec<JarSpec>,
}

impl ExportedCapability {
    pub fn new(
        classpath_entry: impl Into<PathBuf>,
        class_jar_specs: Vec<JarSpec>,
        resource_jar_specs: Vec<JarSpec>,
    ) -> Self {
        ExportedCapability {
            classpath_entry: classpath_entry.into(),
            class_jar_specs,
            resource_jar_specs,
        }
    }

    /// Archive dependents compile against.
    pub fn classpath_entry(&self) -> &Path {
        &self.classpath_entry
    }

    /// Class material merged into dependents that link statically.
    pub fn class_jar_specs(&self) -> &[JarSpec] {
        &self.class_jar_specs
    }

    /// Resource material merged into dependents that link statically.
    pub fn resource_jar_specs(&self) -> &[JarSpec] {
        &self.resource_jar_specs
    }
}

/// What the build graph resolved a dependency name to.
#[derive(Debug, Clone)]
pub enum ResolvedModule {
    /// A library-like module that published its capability
    Library(Arc<ExportedCapability>),
    /// Any other kind of module; it cannot be linked against
    Other { kind: String },
}

/// A dependency name paired with the module the graph resolved it to.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub name: String,
    pub module: ResolvedModule,
}

impl ResolvedDependency {
    pub fn library(name: impl Into<String>, capability: Arc<ExportedCapability>) -> Self {
        ResolvedDependency {
            name: name.into(),
            module: ResolvedModule::Library(capability),
        }
    }

    pub fn other(name: impl Into<String>, kind: impl Into<String>) -> Self {
        ResolvedDependency {
            name: name.into(),
            module: ResolvedModule::Other { kind: kind.into() },
        }
    }

    /// The exported capability, if the module has one.
    pub fn capability(&self) -> Option<&ExportedCapability> {
        match &self.module {
            ResolvedModule::Library(cap) => Some(cap),
            ResolvedModule::Other { .. } => None,
        }
    }
}

//! jarplan - build planning for JVM library modules
//!
//! This crate turns module declarations into ordered transform pipelines:
//! boot classpath selection, dependency declaration and collection, stage
//! planning, and the capability each module publishes to its dependents.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for jarplan unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory source tree and temporary
/// workspace fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    capability::ExportedCapability, descriptor::ModuleDescriptor, descriptor::Variant,
    error::ModuleError, jar_spec::JarSpec,
};

pub use builder::{BuildContext, ModulePlan};
pub use ops::{ModuleTypeRegistry, Workspace, WorkspacePlan};

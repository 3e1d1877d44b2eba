//! Core data structures for jarplan.
//!
//! This module contains the foundational types shared by every pass:
//! - Module descriptors and build variants
//! - Jar specs and merge ordering
//! - Exported capabilities and resolved dependencies
//! - The module error taxonomy

pub mod capability;
pub mod descriptor;
pub mod error;
pub mod jar_spec;

pub use capability::{ExportedCapability, ResolvedDependency, ResolvedModule};
pub use descriptor::{BinaryDescriptor, ModuleDescriptor, PrebuiltDescriptor, Variant};
pub use error::ModuleError;
pub use jar_spec::{merge_entries, JarEntry, JarSpec};

//! Dependency collection - the late pass.
//!
//! After the build graph has resolved every declared name and the
//! dependencies have published their capabilities, each resolved
//! dependency is classified exactly once by set membership against the
//! descriptor, and the classpath and merge set are accumulated.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::capability::{ExportedCapability, ResolvedDependency, ResolvedModule};
use crate::core::descriptor::ModuleDescriptor;
use crate::core::error::ModuleError;
use crate::core::jar_spec::JarSpec;
use crate::resolver::boot::boot_dependency;
use crate::resolver::declare::validate;

/// How a resolved dependency contributes to a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The implicit base library
    Boot,
    /// Classpath only; index into `libs`
    LinkOnly(usize),
    /// Classpath and merged content; index into `static_libs`
    Merge(usize),
    /// Never declared by this module
    Unclassified,
}

/// Classify `name` against a descriptor whose boot library is `boot`.
pub fn classify(desc: &ModuleDescriptor, boot: Option<&str>, name: &str) -> Classification {
    if boot == Some(name) {
        Classification::Boot
    } else if let Some(i) = desc.libs.iter().position(|l| l == name) {
        Classification::LinkOnly(i)
    } else if let Some(i) = desc.static_libs.iter().position(|l| l == name) {
        Classification::Merge(i)
    } else {
        Classification::Unclassified
    }
}

/// Everything a module's pipeline needs from its dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectedDeps {
    /// Boot entry first, then link-only and merged libraries in declared order
    pub classpath: Vec<PathBuf>,

    /// Classpath entry of the boot library, if one was resolved
    pub boot_classpath: Option<PathBuf>,

    /// Class specs exported by merged libraries
    pub class_jar_specs: Vec<JarSpec>,

    /// Resource specs exported by merged libraries
    pub resource_jar_specs: Vec<JarSpec>,
}

/// Classify resolved dependencies and accumulate classpath and merge set.
pub fn collect(
    desc: &ModuleDescriptor,
    resolved: &[ResolvedDependency],
) -> Result<CollectedDeps, ModuleError> {
    validate(desc)?;

    let boot = boot_dependency(desc);
    let mut boot_classpath: Option<PathBuf> = None;
    let mut linked: Vec<(usize, &ExportedCapability)> = Vec::new();
    let mut merged: Vec<(usize, &ExportedCapability)> = Vec::new();

    for dep in resolved {
        let capability = match &dep.module {
            ResolvedModule::Library(cap) => cap.as_ref(),
            ResolvedModule::Other { kind } => {
                return Err(ModuleError::CapabilityMismatch {
                    module: desc.name.clone(),
                    dependency: dep.name.clone(),
                    kind: kind.clone(),
                });
            }
        };

        let classification = classify(desc, boot.as_deref(), &dep.name);
        tracing::debug!("{}: {} is {:?}", desc.name, dep.name, classification);

        match classification {
            Classification::Boot => {
                if boot_classpath.is_some() {
                    return Err(ModuleError::UnknownDependency {
                        module: desc.name.clone(),
                        dependency: dep.name.clone(),
                        reason: "boot library resolved more than once".to_string(),
                    });
                }
                boot_classpath = Some(capability.classpath_entry().to_path_buf());
            }
            Classification::LinkOnly(i) => linked.push((i, capability)),
            Classification::Merge(i) => merged.push((i, capability)),
            Classification::Unclassified => {
                return Err(ModuleError::UnknownDependency {
                    module: desc.name.clone(),
                    dependency: dep.name.clone(),
                    reason: "not declared as the boot library, in `libs` or in `static_libs`"
                        .to_string(),
                });
            }
        }
    }

    linked.sort_by_key(|(i, _)| *i);
    merged.sort_by_key(|(i, _)| *i);

    let mut collected = CollectedDeps {
        boot_classpath: boot_classpath.clone(),
        ..Default::default()
    };

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let entries = boot_classpath
        .into_iter()
        .chain(linked.iter().map(|(_, cap)| cap.classpath_entry().to_path_buf()))
        .chain(merged.iter().map(|(_, cap)| cap.classpath_entry().to_path_buf()));
    for entry in entries {
        if seen.insert(entry.clone()) {
            collected.classpath.push(entry);
        }
    }

    for (_, cap) in &merged {
        collected
            .class_jar_specs
            .extend(cap.class_jar_specs().iter().cloned());
        collected
            .resource_jar_specs
            .extend(cap.resource_jar_specs().iter().cloned());
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::descriptor::Variant;

    fn lib(name: &str) -> ResolvedDependency {
        let cap = ExportedCapability::new(
            format!("{}/out", name),
            vec![JarSpec::new(format!("{}:classes", name), format!("{}/classes", name), format!("{}/classes.list", name))
                .with_entry(format!("{}/Main.class", name))],
            vec![JarSpec::new(format!("{}:res", name), format!("{}/res", name), format!("{}/res.list", name))],
        );
        ResolvedDependency::library(name, Arc::new(cap))
    }

    #[test]
    fn test_collect_boot_only() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app").with_srcs(["A.src"]);

        let collected = collect(&desc, &[lib("core-baselib")]).unwrap();

        assert_eq!(collected.classpath, vec![PathBuf::from("core-baselib/out")]);
        assert_eq!(collected.boot_classpath, Some(PathBuf::from("core-baselib/out")));
        assert!(collected.class_jar_specs.is_empty());
    }

    #[test]
    fn test_collect_declared_order() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .with_libs(["l1", "l2"])
            .with_static_libs(["m1", "m2"]);

        // Visitation order differs from declaration order.
        let resolved = [lib("m2"), lib("l2"), lib("core-baselib"), lib("m1"), lib("l1")];
        let collected = collect(&desc, &resolved).unwrap();

        let classpath: Vec<_> = collected
            .classpath
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            classpath,
            ["core-baselib/out", "l1/out", "l2/out", "m1/out", "m2/out"]
        );
        assert_eq!(collected.classpath.len(), 1 + 2 + 2);

        let specs: Vec<_> = collected.class_jar_specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(specs, ["m1:classes", "m2:classes"]);
        assert_eq!(collected.resource_jar_specs.len(), 2);
    }

    #[test]
    fn test_link_only_contributes_no_specs() {
        let desc = ModuleDescriptor::new("app", Variant::Host, "app").with_libs(["shared"]);

        let collected = collect(&desc, &[lib("shared")]).unwrap();
        assert_eq!(collected.boot_classpath, None);
        assert_eq!(collected.classpath, vec![PathBuf::from("shared/out")]);
        assert!(collected.class_jar_specs.is_empty());
        assert!(collected.resource_jar_specs.is_empty());
    }

    #[test]
    fn test_collect_unknown_dependency() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app");

        match collect(&desc, &[lib("core-baselib"), lib("Z")]) {
            Err(ModuleError::UnknownDependency { dependency, .. }) => assert_eq!(dependency, "Z"),
            other => panic!("expected unknown dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_boot_seen_twice() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app");

        let result = collect(&desc, &[lib("core-baselib"), lib("core-baselib")]);
        assert!(matches!(result, Err(ModuleError::UnknownDependency { .. })));
    }

    #[test]
    fn test_boot_not_recognized_without_standard_libraries() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app").without_standard_libraries();

        let result = collect(&desc, &[lib("core-baselib")]);
        assert!(matches!(result, Err(ModuleError::UnknownDependency { .. })));
    }

    #[test]
    fn test_collect_ambiguous() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .with_libs(["util"])
            .with_static_libs(["util"]);

        let result = collect(&desc, &[lib("util")]);
        assert!(matches!(result, Err(ModuleError::AmbiguousDependency { .. })));
    }

    #[test]
    fn test_collect_capability_mismatch() {
        let desc = ModuleDescriptor::new("app", Variant::Host, "app").with_libs(["native"]);

        match collect(&desc, &[ResolvedDependency::other("native", "cc_library")]) {
            Err(ModuleError::CapabilityMismatch { dependency, kind, .. }) => {
                assert_eq!(dependency, "native");
                assert_eq!(kind, "cc_library");
            }
            other => panic!("expected capability mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_classpath_keeps_first() {
        let desc = ModuleDescriptor::new("app", Variant::Host, "app").with_libs(["a", "b"]);
        let same = Arc::new(ExportedCapability::new("shared/out", vec![], vec![]));

        let collected = collect(
            &desc,
            &[
                ResolvedDependency::library("a", same.clone()),
                ResolvedDependency::library("b", same),
            ],
        )
        .unwrap();
        assert_eq!(collected.classpath, vec![PathBuf::from("shared/out")]);
    }

    #[test]
    fn test_classify() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .with_libs(["l"])
            .with_static_libs(["m"]);

        assert_eq!(classify(&desc, Some("core-baselib"), "core-baselib"), Classification::Boot);
        assert_eq!(classify(&desc, Some("core-baselib"), "l"), Classification::LinkOnly(0));
        assert_eq!(classify(&desc, Some("core-baselib"), "m"), Classification::Merge(0));
        assert_eq!(classify(&desc, None, "core-baselib"), Classification::Unclassified);
    }
}

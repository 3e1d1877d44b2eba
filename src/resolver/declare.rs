//! Dependency declaration - the early pass.
//!
//! Before the build graph is resolved, each module names the modules it
//! needs. Nothing here looks at other modules.

use crate::core::descriptor::ModuleDescriptor;
use crate::core::error::ModuleError;
use crate::resolver::boot::boot_dependency;

/// List the dependency names `desc` asks the graph to resolve.
///
/// Order: boot library (if any), link-only libraries, merged libraries.
/// Duplicates are left for the graph to fold.
pub fn declare(desc: &ModuleDescriptor) -> Result<Vec<String>, ModuleError> {
    validate(desc)?;

    let mut deps = Vec::with_capacity(1 + desc.libs.len() + desc.static_libs.len());
    if let Some(boot) = boot_dependency(desc) {
        deps.push(boot);
    }
    deps.extend(desc.libs.iter().cloned());
    deps.extend(desc.static_libs.iter().cloned());

    tracing::debug!("{} ({}) declares {:?}", desc.name, desc.variant, deps);
    Ok(deps)
}

/// Reject names that would classify more than one way.
pub fn validate(desc: &ModuleDescriptor) -> Result<(), ModuleError> {
    let ambiguous = |dependency: &str, first, second| ModuleError::AmbiguousDependency {
        module: desc.name.clone(),
        dependency: dependency.to_string(),
        first,
        second,
    };

    if let Some(name) = desc.libs.iter().find(|l| desc.is_merged(l)) {
        return Err(ambiguous(name, "libs", "static_libs"));
    }

    if let Some(boot) = boot_dependency(desc) {
        if desc.is_link_only(&boot) {
            return Err(ambiguous(&boot, "the boot classpath", "libs"));
        }
        if desc.is_merged(&boot) {
            return Err(ambiguous(&boot, "the boot classpath", "static_libs"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::Variant;

    #[test]
    fn test_declare_device_default() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app").with_srcs(["A.src"]);
        assert_eq!(declare(&desc).unwrap(), vec!["core-baselib"]);
    }

    #[test]
    fn test_declare_order() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .with_sdk_version("current")
            .with_libs(["b", "a"])
            .with_static_libs(["z", "y"]);

        assert_eq!(
            declare(&desc).unwrap(),
            vec!["stubs-current", "b", "a", "z", "y"]
        );
    }

    #[test]
    fn test_declare_without_standard_libraries() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .without_standard_libraries()
            .with_libs(["framework"]);

        assert_eq!(declare(&desc).unwrap(), vec!["framework"]);
    }

    #[test]
    fn test_declare_host_without_final_format() {
        let desc = ModuleDescriptor::new("tool", Variant::Host, "tool").with_libs(["args"]);
        assert_eq!(declare(&desc).unwrap(), vec!["args"]);
    }

    #[test]
    fn test_declare_rejects_overlap() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .with_libs(["util"])
            .with_static_libs(["util"]);

        match declare(&desc) {
            Err(ModuleError::AmbiguousDependency { dependency, .. }) => {
                assert_eq!(dependency, "util")
            }
            other => panic!("expected ambiguous dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_declare_rejects_boot_in_static_libs() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .with_static_libs(["core-baselib"]);

        assert!(matches!(
            declare(&desc),
            Err(ModuleError::AmbiguousDependency { .. })
        ));
    }

    #[test]
    fn test_boot_name_allowed_in_libs_without_standard_libraries() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .without_standard_libraries()
            .with_libs(["core-baselib"]);

        assert_eq!(declare(&desc).unwrap(), vec!["core-baselib"]);
    }
}

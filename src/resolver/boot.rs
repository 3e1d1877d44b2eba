//! Boot classpath policy.
//!
//! Maps a module's variant and SDK selector to the implicit base library it
//! links against. The same answer is needed when dependencies are declared
//! and again when resolved dependencies are classified, so this must stay a
//! pure function of its inputs.

use crate::core::descriptor::ModuleDescriptor;

/// Base library for device modules without an SDK selector, and for host
/// modules converted to the final format.
pub const CORE_BASELIB: &str = "core-baselib";

/// Public API stubs.
pub const STUBS_CURRENT: &str = "stubs-current";

/// System API stubs.
pub const SYSTEM_STUBS_CURRENT: &str = "system-stubs-current";

/// Name of the implicit base library, or `""` when there is none.
pub fn resolve(target_is_device: bool, produce_final_format: bool, sdk_version: &str) -> String {
    if target_is_device {
        match sdk_version {
            "" => CORE_BASELIB.to_string(),
            "current" => STUBS_CURRENT.to_string(),
            "system_current" => SYSTEM_STUBS_CURRENT.to_string(),
            version => format!("sdk-v{}", version),
        }
    } else if produce_final_format {
        CORE_BASELIB.to_string()
    } else {
        String::new()
    }
}

/// Boot library a descriptor depends on, honoring `no_standard_libraries`.
pub fn boot_dependency(desc: &ModuleDescriptor) -> Option<String> {
    if desc.no_standard_libraries {
        return None;
    }

    let name = resolve(
        desc.variant.is_device(),
        desc.produce_final_format,
        &desc.sdk_version,
    );
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::Variant;

    #[test]
    fn test_device_policy_table() {
        assert_eq!(resolve(true, false, ""), "core-baselib");
        assert_eq!(resolve(true, true, "current"), "stubs-current");
        assert_eq!(resolve(true, false, "system_current"), "system-stubs-current");
        assert_eq!(resolve(true, false, "21"), "sdk-v21");
    }

    #[test]
    fn test_host_policy_ignores_sdk_version() {
        assert_eq!(resolve(false, true, ""), "core-baselib");
        assert_eq!(resolve(false, true, "current"), "core-baselib");
        assert_eq!(resolve(false, false, ""), "");
        assert_eq!(resolve(false, false, "21"), "");
    }

    #[test]
    fn test_boot_dependency_suppressed() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app");
        assert_eq!(boot_dependency(&desc).as_deref(), Some("core-baselib"));

        let desc = desc.without_standard_libraries();
        assert_eq!(boot_dependency(&desc), None);
    }

    #[test]
    fn test_boot_dependency_is_stable() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app").with_sdk_version("system_current");
        assert_eq!(boot_dependency(&desc), boot_dependency(&desc));

        let host = ModuleDescriptor::new("tool", Variant::Host, "tool");
        assert_eq!(boot_dependency(&host), None);
    }
}

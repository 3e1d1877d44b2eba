//! Module descriptors - what a module asks to have built.
//!
//! Descriptors are created once from workspace configuration and are never
//! mutated afterwards. Every pass over a module (dependency declaration,
//! collection, pipeline assembly) reads the same descriptor value.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Build variant of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Built for the build machine itself
    Host,
    /// Built for the target device
    Device,
}

impl Variant {
    /// Whether this variant targets the device.
    pub fn is_device(&self) -> bool {
        matches!(self, Variant::Device)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Host => "host",
            Variant::Device => "device",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "host" => Ok(Variant::Host),
            "device" | "target" => Ok(Variant::Device),
            other => Err(format!("unknown variant `{}` (expected host or device)", other)),
        }
    }
}

/// Configuration of a compiled library module.
///
/// All relative paths are relative to `dir`, the module's source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name, unique per variant
    pub name: String,

    /// Which variant this descriptor describes
    pub variant: Variant,

    /// Module source directory
    pub dir: PathBuf,

    /// Source patterns (may contain globs)
    #[serde(default)]
    pub srcs: Vec<String>,

    /// Directories whose contents are packaged as resources
    #[serde(default)]
    pub resource_dirs: Vec<String>,

    /// Don't link against the implicit base library
    #[serde(default)]
    pub no_standard_libraries: bool,

    /// Convert the merged archive into the final executable format
    #[serde(default)]
    pub produce_final_format: bool,

    /// Extra flags for the compile stage
    #[serde(default)]
    pub compiler_flags: Vec<String>,

    /// Extra flags for the final-format convert stage
    #[serde(default)]
    pub convert_flags: Vec<String>,

    /// Libraries that only contribute a classpath entry
    #[serde(default)]
    pub libs: Vec<String>,

    /// Libraries whose content is merged into this module's archive
    #[serde(default)]
    pub static_libs: Vec<String>,

    /// Manifest file embedded in the merged archive
    #[serde(default)]
    pub manifest: Option<PathBuf>,

    /// Rule file for the rename stage
    #[serde(default)]
    pub rename_rules: Option<PathBuf>,

    /// SDK version selector for the boot classpath
    #[serde(default)]
    pub sdk_version: String,
}

impl ModuleDescriptor {
    /// Create a descriptor with no sources and no dependencies.
    pub fn new(name: impl Into<String>, variant: Variant, dir: impl Into<PathBuf>) -> Self {
        ModuleDescriptor {
            name: name.into(),
            variant,
            dir: dir.into(),
            srcs: Vec::new(),
            resource_dirs: Vec::new(),
            no_standard_libraries: false,
            produce_final_format: false,
            compiler_flags: Vec::new(),
            convert_flags: Vec::new(),
            libs: Vec::new(),
            static_libs: Vec::new(),
            manifest: None,
            rename_rules: None,
            sdk_version: String::new(),
        }
    }

    pub fn with_srcs<S: Into<String>>(mut self, srcs: impl IntoIterator<Item = S>) -> Self {
        self.srcs = srcs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resource_dirs<S: Into<String>>(
        mut self,
        dirs: impl IntoIterator<Item = S>,
    ) -> Self {
        self.resource_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_libs<S: Into<String>>(mut self, libs: impl IntoIterator<Item = S>) -> Self {
        self.libs = libs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_static_libs<S: Into<String>>(mut self, libs: impl IntoIterator<Item = S>) -> Self {
        self.static_libs = libs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sdk_version(mut self, sdk_version: impl Into<String>) -> Self {
        self.sdk_version = sdk_version.into();
        self
    }

    pub fn with_final_format(mut self, enabled: bool) -> Self {
        self.produce_final_format = enabled;
        self
    }

    pub fn without_standard_libraries(mut self) -> Self {
        self.no_standard_libraries = true;
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    pub fn with_rename_rules(mut self, rules: impl Into<PathBuf>) -> Self {
        self.rename_rules = Some(rules.into());
        self
    }

    /// Whether `name` is declared as a link-only library.
    pub fn is_link_only(&self, name: &str) -> bool {
        self.libs.iter().any(|l| l == name)
    }

    /// Whether `name` is declared as a merged library.
    pub fn is_merged(&self, name: &str) -> bool {
        self.static_libs.iter().any(|l| l == name)
    }
}

/// Configuration of a module built from one pre-existing archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrebuiltDescriptor {
    pub name: String,
    pub variant: Variant,
    pub dir: PathBuf,
    /// Must name exactly one archive
    #[serde(default)]
    pub srcs: Vec<String>,
}

/// Configuration of a binary: a library plus a launcher script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryDescriptor {
    pub library: ModuleDescriptor,
    /// Launcher script, relative to the module directory
    pub wrapper: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parse() {
        assert_eq!("host".parse::<Variant>().unwrap(), Variant::Host);
        assert_eq!("Device".parse::<Variant>().unwrap(), Variant::Device);
        assert_eq!("target".parse::<Variant>().unwrap(), Variant::Device);
        assert!("arm64".parse::<Variant>().is_err());
    }

    #[test]
    fn test_descriptor_list_membership() {
        let desc = ModuleDescriptor::new("app", Variant::Device, "app")
            .with_libs(["shared"])
            .with_static_libs(["merged"]);

        assert!(desc.is_link_only("shared"));
        assert!(!desc.is_link_only("merged"));
        assert!(desc.is_merged("merged"));
        assert!(!desc.is_merged("other"));
    }
}

//! Workspace manifest and module types.
//!
//! A workspace is described by `JarPlan.toml`: a list of `[[module]]`
//! tables. Each module names a type from the `ModuleTypeRegistry`, which
//! decides the variants it is built for and how it is planned.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::binary::plan_binary;
use crate::builder::context::BuildContext;
use crate::builder::pipeline::plan_library;
use crate::builder::plan::ModulePlan;
use crate::builder::prebuilt::plan_prebuilt;
use crate::core::capability::ResolvedDependency;
use crate::core::descriptor::{BinaryDescriptor, ModuleDescriptor, PrebuiltDescriptor, Variant};
use crate::core::error::ModuleError;
use crate::resolver::declare::declare;
use crate::util::fs::read_to_string;

/// Workspace manifest file name.
pub const MANIFEST_NAME: &str = "JarPlan.toml";

/// One `[[module]]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub module_type: String,
    /// Module directory, relative to the workspace root
    #[serde(default)]
    pub dir: PathBuf,
    #[serde(default)]
    pub srcs: Vec<String>,
    #[serde(default)]
    pub resource_dirs: Vec<String>,
    #[serde(default)]
    pub no_standard_libraries: bool,
    #[serde(default)]
    pub compiler_flags: Vec<String>,
    #[serde(default)]
    pub convert_flags: Vec<String>,
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub static_libs: Vec<String>,
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    #[serde(default)]
    pub sdk_version: String,
    #[serde(default)]
    pub rename_rules: Option<PathBuf>,
    #[serde(default)]
    pub wrapper: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WorkspaceManifest {
    #[serde(default, rename = "module")]
    modules: Vec<ModuleDecl>,
}

/// A loaded workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    modules: Vec<ModuleDecl>,
}

impl Workspace {
    /// Load a workspace from its manifest file.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let contents = read_to_string(manifest_path)?;
        let root = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::parse(&root, &contents)
            .with_context(|| format!("failed to parse manifest: {}", manifest_path.display()))
    }

    /// Parse a workspace manifest rooted at `root`.
    pub fn parse(root: &Path, contents: &str) -> Result<Self> {
        let manifest: WorkspaceManifest = toml::from_str(contents)?;
        Ok(Workspace {
            root: root.to_path_buf(),
            modules: manifest.modules,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn modules(&self) -> &[ModuleDecl] {
        &self.modules
    }

    /// Find a module declaration by name.
    pub fn module(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.iter().find(|m| m.name == name)
    }
}

/// Find the workspace manifest in `start` or any parent directory.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}

/// How a module type is planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleShape {
    Library,
    Binary,
    Prebuilt,
}

/// A registered module type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleType {
    pub name: &'static str,
    pub variants: &'static [Variant],
    pub produce_final_format: bool,
    pub shape: ModuleShape,
}

/// Module types known to a workspace build.
#[derive(Debug, Clone, Default)]
pub struct ModuleTypeRegistry {
    types: BTreeMap<&'static str, ModuleType>,
}

impl ModuleTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ModuleTypeRegistry::default()
    }

    /// Registry with the built-in library, binary and prebuilt types.
    pub fn with_builtin_types() -> Self {
        const BOTH: &[Variant] = &[Variant::Device, Variant::Host];
        const HOST: &[Variant] = &[Variant::Host];

        let mut registry = ModuleTypeRegistry::new();
        registry.register(ModuleType {
            name: "library",
            variants: BOTH,
            produce_final_format: true,
            shape: ModuleShape::Library,
        });
        registry.register(ModuleType {
            name: "library_host",
            variants: HOST,
            produce_final_format: false,
            shape: ModuleShape::Library,
        });
        registry.register(ModuleType {
            name: "binary",
            variants: BOTH,
            produce_final_format: true,
            shape: ModuleShape::Binary,
        });
        registry.register(ModuleType {
            name: "binary_host",
            variants: HOST,
            produce_final_format: false,
            shape: ModuleShape::Binary,
        });
        registry.register(ModuleType {
            name: "prebuilt",
            variants: BOTH,
            produce_final_format: false,
            shape: ModuleShape::Prebuilt,
        });
        registry
    }

    /// Register a module type, replacing any type of the same name.
    pub fn register(&mut self, module_type: ModuleType) {
        self.types.insert(module_type.name, module_type);
    }

    pub fn get(&self, name: &str) -> Option<&ModuleType> {
        self.types.get(name)
    }

    /// Names of all registered types.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }

    /// Look up the type of a declaration.
    pub fn type_of(&self, decl: &ModuleDecl) -> Result<&ModuleType> {
        match self.get(&decl.module_type) {
            Some(ty) => Ok(ty),
            None => bail!(
                "unknown module type `{}` for `{}` (known types: {})",
                decl.module_type,
                decl.name,
                self.names().collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

/// One module variant, ready to be declared and planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleInstance {
    Library(ModuleDescriptor),
    Binary(BinaryDescriptor),
    Prebuilt(PrebuiltDescriptor),
}

impl ModuleInstance {
    /// Build the descriptor of `decl` for one variant.
    pub fn new(
        root: &Path,
        decl: &ModuleDecl,
        module_type: &ModuleType,
        variant: Variant,
    ) -> Result<Self, ModuleError> {
        let dir = if decl.dir.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(&decl.dir)
        };

        if module_type.shape == ModuleShape::Prebuilt {
            return Ok(ModuleInstance::Prebuilt(PrebuiltDescriptor {
                name: decl.name.clone(),
                variant,
                dir,
                srcs: decl.srcs.clone(),
            }));
        }

        let library = ModuleDescriptor {
            name: decl.name.clone(),
            variant,
            dir,
            srcs: decl.srcs.clone(),
            resource_dirs: decl.resource_dirs.clone(),
            no_standard_libraries: decl.no_standard_libraries,
            produce_final_format: module_type.produce_final_format,
            compiler_flags: decl.compiler_flags.clone(),
            convert_flags: decl.convert_flags.clone(),
            libs: decl.libs.clone(),
            static_libs: decl.static_libs.clone(),
            manifest: decl.manifest.clone(),
            rename_rules: decl.rename_rules.clone(),
            sdk_version: decl.sdk_version.clone(),
        };

        match module_type.shape {
            ModuleShape::Binary => {
                let Some(wrapper) = decl.wrapper.clone() else {
                    return Err(ModuleError::configuration(
                        &decl.name,
                        format!("`{}` modules need a `wrapper` launcher script", module_type.name),
                    ));
                };
                Ok(ModuleInstance::Binary(BinaryDescriptor { library, wrapper }))
            }
            _ => Ok(ModuleInstance::Library(library)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ModuleInstance::Library(d) => &d.name,
            ModuleInstance::Binary(d) => &d.library.name,
            ModuleInstance::Prebuilt(d) => &d.name,
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            ModuleInstance::Library(d) => d.variant,
            ModuleInstance::Binary(d) => d.library.variant,
            ModuleInstance::Prebuilt(d) => d.variant,
        }
    }

    /// Dependency names to resolve before this module can be planned.
    pub fn declare(&self) -> Result<Vec<String>, ModuleError> {
        match self {
            ModuleInstance::Library(d) => declare(d),
            ModuleInstance::Binary(d) => declare(&d.library),
            ModuleInstance::Prebuilt(_) => Ok(Vec::new()),
        }
    }

    /// Plan the module against its resolved dependencies.
    pub fn plan(
        &self,
        ctx: &BuildContext,
        resolved: &[ResolvedDependency],
        module_type: &str,
    ) -> Result<ModulePlan, ModuleError> {
        match self {
            ModuleInstance::Library(d) => plan_library(ctx, d, resolved, module_type),
            ModuleInstance::Binary(d) => plan_binary(ctx, d, resolved, module_type),
            ModuleInstance::Prebuilt(d) => plan_prebuilt(ctx, d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[[module]]
name = "core-baselib"
type = "prebuilt"
dir = "prebuilts"
srcs = ["core.jar"]

[[module]]
name = "app"
type = "binary"
dir = "app"
srcs = ["src/**/*.java"]
static_libs = ["util"]
wrapper = "app.sh"
"#;

    #[test]
    fn test_parse_workspace() {
        let ws = Workspace::parse(Path::new("/ws"), MANIFEST).unwrap();

        assert_eq!(ws.modules().len(), 2);
        let app = ws.module("app").unwrap();
        assert_eq!(app.module_type, "binary");
        assert_eq!(app.static_libs, vec!["util"]);
        assert_eq!(app.wrapper, Some(PathBuf::from("app.sh")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Workspace::parse(
            Path::new("/ws"),
            "[[module]]\nname = \"a\"\ntype = \"library\"\njava_libs = []\n",
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_registry_types() {
        let registry = ModuleTypeRegistry::with_builtin_types();

        let library = registry.get("library").unwrap();
        assert_eq!(library.variants, &[Variant::Device, Variant::Host]);
        assert!(library.produce_final_format);

        let host = registry.get("library_host").unwrap();
        assert_eq!(host.variants, &[Variant::Host]);
        assert!(!host.produce_final_format);

        let decl = ModuleDecl {
            name: "x".to_string(),
            module_type: "genrule".to_string(),
            ..Default::default()
        };
        let err = registry.type_of(&decl).unwrap_err();
        assert!(err.to_string().contains("unknown module type `genrule`"));
    }

    #[test]
    fn test_instance_from_decl() {
        let ws = Workspace::parse(Path::new("/ws"), MANIFEST).unwrap();
        let registry = ModuleTypeRegistry::with_builtin_types();
        let app = ws.module("app").unwrap();

        let instance =
            ModuleInstance::new(ws.root(), app, registry.type_of(app).unwrap(), Variant::Device).unwrap();
        match &instance {
            ModuleInstance::Binary(bin) => {
                assert_eq!(bin.library.dir, PathBuf::from("/ws/app"));
                assert!(bin.library.produce_final_format);
            }
            other => panic!("expected binary, got {:?}", other),
        }
        assert_eq!(instance.declare().unwrap(), vec!["core-baselib", "util"]);
    }

    #[test]
    fn test_binary_without_wrapper() {
        let decl = ModuleDecl {
            name: "tool".to_string(),
            module_type: "binary_host".to_string(),
            ..Default::default()
        };
        let registry = ModuleTypeRegistry::with_builtin_types();

        let err = ModuleInstance::new(
            Path::new("/ws"),
            &decl,
            registry.type_of(&decl).unwrap(),
            Variant::Host,
        )
        .unwrap_err();
        assert!(matches!(err, ModuleError::Configuration { .. }));
    }

    #[test]
    fn test_find_manifest_in_parent() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "").unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_manifest(&nested), Some(tmp.path().join(MANIFEST_NAME)));
    }
}

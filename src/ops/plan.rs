//! Implementation of `jarplan plan`.
//!
//! Modules are planned in dependency order. Each module variant first
//! declares its dependency names, the names are resolved within the same
//! variant, and the resulting graph is walked level by level. Modules on
//! one level only read capabilities published by earlier levels, so a level
//! is planned in parallel.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{bail, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::builder::plan::ModulePlan;
use crate::core::capability::{ExportedCapability, ResolvedDependency};
use crate::core::descriptor::Variant;
use crate::core::error::ModuleError;
use crate::ops::workspace::{ModuleInstance, ModuleTypeRegistry, Workspace};
use crate::resolver::boot::boot_dependency;
use crate::resolver::collect::{classify, Classification};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Options for the plan command.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Only plan this variant (empty = every variant)
    pub variant: Option<Variant>,

    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// A module variant that could not be planned.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleFailure {
    pub module: String,
    pub variant: Variant,
    pub message: String,
    #[serde(skip)]
    pub diagnostic: Diagnostic,
}

impl ModuleFailure {
    fn from_error(variant: Variant, err: &ModuleError) -> Self {
        ModuleFailure {
            module: err.module().to_string(),
            variant,
            message: err.to_string(),
            diagnostic: err.to_diagnostic(),
        }
    }

    fn dependency_failed(module: &str, variant: Variant, dependency: &str) -> Self {
        let message = format!("dependency `{}` of `{}` failed to plan", dependency, module);
        ModuleFailure {
            module: module.to_string(),
            variant,
            diagnostic: Diagnostic::error(message.clone())
                .with_context(format!("`{}` ({}) was not planned", module, variant))
                .with_suggestion(suggestions::DEPENDENCY_FAILED),
            message,
        }
    }
}

/// The plan of a whole workspace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkspacePlan {
    /// Planned modules, dependencies before dependents
    pub modules: Vec<ModulePlan>,

    /// Modules that failed, with the reason
    pub failures: Vec<ModuleFailure>,
}

impl WorkspacePlan {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Find the plan of a module variant.
    pub fn module(&self, name: &str, variant: Variant) -> Option<&ModulePlan> {
        self.modules
            .iter()
            .find(|m| m.name == name && m.variant == variant)
    }

    /// Find the failure of a module variant.
    pub fn failure(&self, name: &str, variant: Variant) -> Option<&ModuleFailure> {
        self.failures
            .iter()
            .find(|f| f.module == name && f.variant == variant)
    }
}

type ModuleKey = (String, Variant);

struct Node {
    module_type: &'static str,
    instance: ModuleInstance,
    /// Declared dependency names, resolved to node indices
    deps: Vec<(String, usize)>,
}

/// Instantiate every module variant of the workspace.
fn instantiate(
    ws: &Workspace,
    registry: &ModuleTypeRegistry,
    options: &PlanOptions,
    failures: &mut Vec<ModuleFailure>,
    failed: &mut HashSet<ModuleKey>,
) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    let mut seen: HashSet<ModuleKey> = HashSet::new();

    for decl in ws.modules() {
        let module_type = registry.type_of(decl)?;

        for &variant in module_type.variants {
            if options.variant.is_some_and(|v| v != variant) {
                continue;
            }

            let key = (decl.name.clone(), variant);
            if !seen.insert(key.clone()) {
                bail!("module `{}` ({}) is defined more than once", decl.name, variant);
            }

            match ModuleInstance::new(ws.root(), decl, module_type, variant) {
                Ok(instance) => nodes.push(Node {
                    module_type: module_type.name,
                    instance,
                    deps: Vec::new(),
                }),
                Err(err) => {
                    failures.push(ModuleFailure::from_error(variant, &err));
                    failed.insert(key);
                }
            }
        }
    }

    Ok(nodes)
}

/// Run the declaration pass and resolve names within each variant.
///
/// Returns the indices of nodes whose declaration succeeded.
fn declare_all(
    nodes: &mut [Node],
    failures: &mut Vec<ModuleFailure>,
    failed: &mut HashSet<ModuleKey>,
) -> Vec<usize> {
    let index: HashMap<ModuleKey, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| ((n.instance.name().to_string(), n.instance.variant()), i))
        .collect();

    let mut declared = Vec::new();
    for i in 0..nodes.len() {
        let name = nodes[i].instance.name().to_string();
        let variant = nodes[i].instance.variant();

        let names = match nodes[i].instance.declare() {
            Ok(names) => names,
            Err(err) => {
                failures.push(ModuleFailure::from_error(variant, &err));
                failed.insert((name, variant));
                continue;
            }
        };

        let mut deps = Vec::new();
        let mut error = None;
        for dep in names {
            let key = (dep.clone(), variant);
            if let Some(&j) = index.get(&key) {
                if !deps.iter().any(|(d, _)| *d == dep) {
                    deps.push((dep, j));
                }
            } else if failed.contains(&key) {
                // Planned later as a dependency failure.
                deps.push((dep, usize::MAX));
            } else {
                error = Some(ModuleError::UnknownDependency {
                    module: name.clone(),
                    dependency: dep,
                    reason: format!("no module of that name is defined for the {} variant", variant),
                });
                break;
            }
        }

        match error {
            Some(err) => {
                failures.push(ModuleFailure::from_error(variant, &err));
                failed.insert((name, variant));
            }
            None => {
                nodes[i].deps = deps;
                declared.push(i);
            }
        }
    }

    declared
}

/// Group declared nodes into levels; a node's dependencies are all on
/// earlier levels.
fn plan_levels(nodes: &[Node], declared: &[usize]) -> Result<Vec<Vec<usize>>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut to_node: HashMap<usize, NodeIndex> = HashMap::new();
    for &i in declared {
        to_node.insert(i, graph.add_node(i));
    }

    // An edge a -> b means a depends on b.
    for &i in declared {
        for (_, j) in &nodes[i].deps {
            if let (Some(&from), Some(&to)) = (to_node.get(&i), to_node.get(j)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut order = match petgraph::algo::toposort(&graph, None) {
        Ok(order) => order,
        Err(cycle) => {
            let node = &nodes[graph[cycle.node_id()]].instance;
            bail!(
                "dependency cycle detected involving `{}` ({})",
                node.name(),
                node.variant()
            );
        }
    };
    // Dependencies before dependents.
    order.reverse();

    let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
    let mut levels: Vec<Vec<usize>> = Vec::new();
    for node in order {
        let level = graph
            .neighbors(node)
            .filter_map(|dep| depth.get(&dep))
            .map(|d| d + 1)
            .max()
            .unwrap_or(0);
        depth.insert(node, level);

        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(graph[node]);
    }

    for level in &mut levels {
        level.sort_unstable();
    }
    Ok(levels)
}

/// Plan one node against the capabilities published by earlier levels.
fn plan_node(
    ctx: &BuildContext,
    node: &Node,
    published: &HashMap<usize, Arc<ExportedCapability>>,
) -> Result<ModulePlan, ModuleFailure> {
    let name = node.instance.name();
    let variant = node.instance.variant();

    let mut resolved = Vec::with_capacity(node.deps.len());
    for (dep, j) in &node.deps {
        // Only successfully planned modules are published.
        match published.get(j) {
            Some(cap) => resolved.push(ResolvedDependency::library(dep.clone(), Arc::clone(cap))),
            None => return Err(ModuleFailure::dependency_failed(name, variant, dep)),
        }
    }

    node.instance
        .plan(ctx, &resolved, node.module_type)
        .map_err(|err| ModuleFailure::from_error(variant, &err))
}

/// Plan every module of a workspace.
///
/// Module failures are collected in the returned plan; only workspace-level
/// problems (unknown module types, duplicate modules, cycles) are errors.
pub fn plan_workspace(
    ws: &Workspace,
    registry: &ModuleTypeRegistry,
    ctx: &BuildContext,
    options: &PlanOptions,
) -> Result<WorkspacePlan> {
    if let Some(j) = options.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(j)
            .build_global()
            .ok(); // Ignore if already set
    }

    let mut failures = Vec::new();
    let mut failed: HashSet<ModuleKey> = HashSet::new();

    let mut nodes = instantiate(ws, registry, options, &mut failures, &mut failed)?;
    let declared = declare_all(&mut nodes, &mut failures, &mut failed);
    let levels = plan_levels(&nodes, &declared)?;

    tracing::info!(
        "Planning {} modules in {} levels",
        declared.len(),
        levels.len()
    );

    let mut published: HashMap<usize, Arc<ExportedCapability>> = HashMap::new();
    let mut modules = Vec::new();

    for level in levels {
        let results: Vec<(usize, Result<ModulePlan, ModuleFailure>)> = level
            .par_iter()
            .map(|&i| (i, plan_node(ctx, &nodes[i], &published)))
            .collect();

        for (i, result) in results {
            match result {
                Ok(plan) => {
                    tracing::debug!("planned {} ({})", plan.name, plan.variant);
                    published.insert(i, Arc::new(plan.capability.clone()));
                    modules.push(plan);
                }
                Err(failure) => {
                    tracing::debug!("{}", failure.message);
                    failed.insert((failure.module.clone(), failure.variant));
                    failures.push(failure);
                }
            }
        }
    }

    Ok(WorkspacePlan { modules, failures })
}

/// One declared dependency and how it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRow {
    pub name: String,
    /// `boot`, `libs`, `static_libs`, or `undeclared` for a name the
    /// classifier does not recognize
    pub kind: &'static str,
}

/// Declared dependencies of a module variant, in declaration order.
pub fn module_dependencies(
    ws: &Workspace,
    registry: &ModuleTypeRegistry,
    name: &str,
    variant: Variant,
) -> Result<Vec<DependencyRow>> {
    let Some(decl) = ws.module(name) else {
        bail!(
            "module `{}` not found in workspace\n{}",
            name,
            suggestions::MODULE_NOT_FOUND
        );
    };
    let module_type = registry.type_of(decl)?;
    if !module_type.variants.contains(&variant) {
        bail!(
            "module `{}` has no {} variant (a `{}` module)",
            name,
            variant,
            module_type.name
        );
    }

    let instance = ModuleInstance::new(ws.root(), decl, module_type, variant)?;
    let names = instance.declare()?;

    let desc = match &instance {
        ModuleInstance::Library(d) => d,
        ModuleInstance::Binary(d) => &d.library,
        ModuleInstance::Prebuilt(_) => return Ok(Vec::new()),
    };
    let boot = boot_dependency(desc);

    Ok(names
        .into_iter()
        .map(|dep| DependencyRow {
            kind: dependency_kind(classify(desc, boot.as_deref(), &dep)),
            name: dep,
        })
        .collect())
}

/// Label of a classification in `jarplan deps` output.
fn dependency_kind(classification: Classification) -> &'static str {
    match classification {
        Classification::Boot => "boot",
        Classification::LinkOnly(_) => "libs",
        Classification::Merge(_) => "static_libs",
        Classification::Unclassified => "undeclared",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::StageKind;
    use crate::test_support::WorkspaceFixture;

    const BASE: &str = r#"
[[module]]
name = "core-baselib"
type = "prebuilt"
dir = "prebuilts"
srcs = ["core.jar"]

[[module]]
name = "stubs-current"
type = "prebuilt"
dir = "prebuilts"
srcs = ["stubs.jar"]
"#;

    fn fixture(modules: &str) -> WorkspaceFixture {
        WorkspaceFixture::new(&format!("{}{}", BASE, modules))
            .with_file("prebuilts/core.jar", "")
            .with_file("prebuilts/stubs.jar", "")
    }

    fn plan(fixture: &WorkspaceFixture, variant: Option<Variant>) -> WorkspacePlan {
        let ws = fixture.workspace();
        let ctx = fixture.context();
        let options = PlanOptions {
            variant,
            jobs: None,
        };
        plan_workspace(&ws, &ModuleTypeRegistry::with_builtin_types(), &ctx, &options).unwrap()
    }

    #[test]
    fn test_dependencies_planned_first() {
        let fx = fixture(
            r#"
[[module]]
name = "app"
type = "library"
dir = "app"
srcs = ["A.java"]
static_libs = ["util"]

[[module]]
name = "util"
type = "library"
dir = "util"
srcs = ["U.java"]
"#,
        )
        .with_file("app/A.java", "class A {}")
        .with_file("util/U.java", "class U {}");

        let result = plan(&fx, Some(Variant::Device));
        assert!(result.is_success(), "{:?}", result.failures);

        let names: Vec<&str> = result.modules.iter().map(|m| m.name.as_str()).collect();
        let util = names.iter().position(|n| *n == "util").unwrap();
        let app = names.iter().position(|n| *n == "app").unwrap();
        assert!(util < app);

        // util's classes are merged into app's archive
        let app = result.module("app", Variant::Device).unwrap();
        let merge = app.stage(StageKind::Merge).unwrap();
        let spec_names: Vec<&str> = merge.jar_specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(spec_names, vec!["app:classes", "util:classes"]);
        assert_eq!(
            app.classpath[0],
            fx.root().join("prebuilts/core.jar"),
            "boot entry leads the classpath"
        );
    }

    #[test]
    fn test_variants_resolve_separately() {
        let fx = fixture(
            r#"
[[module]]
name = "hostlib"
type = "library_host"
dir = "hostlib"
srcs = ["H.java"]

[[module]]
name = "app"
type = "library"
dir = "app"
srcs = ["A.java"]
libs = ["hostlib"]
"#,
        )
        .with_file("hostlib/H.java", "")
        .with_file("app/A.java", "");

        let result = plan(&fx, None);

        assert!(result.module("app", Variant::Host).is_some());
        let failure = result.failure("app", Variant::Device).unwrap();
        assert!(failure.message.contains("unknown dependency `hostlib`"));
        assert!(result.module("hostlib", Variant::Host).is_some());
    }

    #[test]
    fn test_failure_propagates_to_dependents() {
        let fx = fixture(
            r#"
[[module]]
name = "broken"
type = "library"
dir = "broken"
srcs = ["Missing.java"]

[[module]]
name = "app"
type = "library"
dir = "app"
srcs = ["A.java"]
libs = ["broken"]

[[module]]
name = "other"
type = "library"
dir = "other"
srcs = ["O.java"]
"#,
        )
        .with_file("app/A.java", "")
        .with_file("other/O.java", "");

        let result = plan(&fx, Some(Variant::Device));

        let broken = result.failure("broken", Variant::Device).unwrap();
        assert!(broken.message.contains("compile stage failed"));
        let app = result.failure("app", Variant::Device).unwrap();
        assert!(app.message.contains("dependency `broken` of `app` failed"));
        assert!(result.module("other", Variant::Device).is_some());
    }

    #[test]
    fn test_binary_without_wrapper_fails_dependents() {
        let fx = fixture(
            r#"
[[module]]
name = "tool"
type = "binary_host"
dir = "tool"
srcs = ["T.java"]

[[module]]
name = "user"
type = "library_host"
dir = "user"
srcs = ["U.java"]
libs = ["tool"]
"#,
        )
        .with_file("tool/T.java", "")
        .with_file("user/U.java", "");

        let result = plan(&fx, None);
        assert!(result.failure("tool", Variant::Host).is_some());
        let user = result.failure("user", Variant::Host).unwrap();
        assert!(user.message.contains("dependency `tool`"));
    }

    #[test]
    fn test_cycle_is_an_error() {
        let fx = fixture(
            r#"
[[module]]
name = "a"
type = "library"
libs = ["b"]

[[module]]
name = "b"
type = "library"
libs = ["a"]
"#,
        );

        let ws = fx.workspace();
        let err = plan_workspace(
            &ws,
            &ModuleTypeRegistry::with_builtin_types(),
            &fx.context(),
            &PlanOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("dependency cycle"));
    }

    #[test]
    fn test_duplicate_module_is_an_error() {
        let fx = fixture(
            r#"
[[module]]
name = "a"
type = "library"

[[module]]
name = "a"
type = "library_host"
"#,
        );

        let ws = fx.workspace();
        let err = plan_workspace(
            &ws,
            &ModuleTypeRegistry::with_builtin_types(),
            &fx.context(),
            &PlanOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("defined more than once"));
    }

    #[test]
    fn test_module_dependencies() {
        let fx = fixture(
            r#"
[[module]]
name = "app"
type = "library"
libs = ["x"]
static_libs = ["y"]

[[module]]
name = "tool"
type = "library_host"
libs = ["x"]
"#,
        );
        let ws = fx.workspace();
        let registry = ModuleTypeRegistry::with_builtin_types();

        let rows = module_dependencies(&ws, &registry, "app", Variant::Device).unwrap();
        let rows: Vec<(&str, &str)> = rows.iter().map(|r| (r.name.as_str(), r.kind)).collect();
        assert_eq!(
            rows,
            vec![("core-baselib", "boot"), ("x", "libs"), ("y", "static_libs")]
        );

        // Host modules kept in class form have no boot library
        let host = module_dependencies(&ws, &registry, "tool", Variant::Host).unwrap();
        assert_eq!(host, vec![DependencyRow { name: "x".to_string(), kind: "libs" }]);
        assert!(module_dependencies(&ws, &registry, "tool", Variant::Device).is_err());

        assert!(module_dependencies(&ws, &registry, "nope", Variant::Device).is_err());
    }

    #[test]
    fn test_dependency_kind_labels() {
        assert_eq!(dependency_kind(Classification::Boot), "boot");
        assert_eq!(dependency_kind(Classification::LinkOnly(0)), "libs");
        assert_eq!(dependency_kind(Classification::Merge(1)), "static_libs");
        assert_eq!(dependency_kind(Classification::Unclassified), "undeclared");
    }

    #[test]
    fn test_prebuilt_artifact_is_archive() {
        let fx = fixture("");
        let result = plan(&fx, Some(Variant::Device));
        let core = result.module("core-baselib", Variant::Device).unwrap();
        assert_eq!(core.artifact, fx.root().join("prebuilts/core.jar"));
        assert_eq!(
            core.installed_artifact(),
            Some(&fx.root().join("out/install/device/framework/core-baselib.jar"))
        );
    }
}

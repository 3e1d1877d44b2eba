//! Compilation pipeline.
//!
//! Turns a descriptor and its collected dependencies into the ordered chain
//! of stages that builds the module:
//!
//! 1. compile sources into one class spec (skipped without sources)
//! 2. package each resource directory into one resource spec
//! 3. merge own classes, merged classes, own resources and merged resources
//!    into one archive, embedding the manifest
//! 4. rename symbols per the rule file (only with rename rules)
//! 5. convert to the final format and re-merge with resources (only when
//!    the final format is requested)
//!
//! The capability is assembled only after the last stage was planned, so a
//! failing stage never leaves a partial capability behind.

use std::path::{Path, PathBuf};

use crate::builder::context::{BuildContext, ARCHIVE_EXTENSION, FRAMEWORK_CATEGORY};
use crate::builder::plan::{InstallRule, ModulePlan, PipelineStage, StageKind};
use crate::core::capability::{ExportedCapability, ResolvedDependency};
use crate::core::descriptor::{ModuleDescriptor, Variant};
use crate::core::error::ModuleError;
use crate::core::jar_spec::{archive_path, JarEntry, JarSpec};
use crate::resolver::boot::boot_dependency;
use crate::resolver::collect::{collect, CollectedDeps};
use crate::util::fs::{relative_path, source_root};

/// Result of a completed pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Stages in execution order
    pub stages: Vec<PipelineStage>,
    /// Final artifact of the module
    pub artifact: PathBuf,
    /// Capability published to dependents
    pub capability: ExportedCapability,
}

/// Plan the stages that build `desc` against its collected dependencies.
pub fn build(
    ctx: &BuildContext,
    desc: &ModuleDescriptor,
    deps: &CollectedDeps,
) -> Result<PipelineOutput, ModuleError> {
    let out_dir = ctx.module_out_dir(&desc.name, desc.variant);
    let mut stages = Vec::new();

    let own_classes = compile_stage(ctx, desc, deps, &out_dir)?.map(|(stage, spec)| {
        stages.push(stage);
        spec
    });

    let mut own_resources = Vec::with_capacity(desc.resource_dirs.len());
    for (index, dir) in desc.resource_dirs.iter().enumerate() {
        let (stage, spec) = resource_stage(ctx, desc, dir, index, &out_dir)?;
        stages.push(stage);
        own_resources.push(spec);
    }

    let mut class_specs: Vec<JarSpec> = own_classes.iter().cloned().collect();
    class_specs.extend(deps.class_jar_specs.iter().cloned());

    let mut resource_specs = own_resources.clone();
    resource_specs.extend(deps.resource_jar_specs.iter().cloned());

    let merge = merge_stage(ctx, desc, &class_specs, &resource_specs, &out_dir)?;
    let mut current = merge.output.clone();
    stages.push(merge);

    if let Some(rules) = &desc.rename_rules {
        let stage = rename_stage(ctx, desc, rules, &current, &out_dir)?;
        current = stage.output.clone();
        stages.push(stage);
    }

    // Dependents compile against the renamed archive, never the converted one.
    let classpath_entry = current.clone();

    if desc.produce_final_format {
        let convert = convert_stage(ctx, desc, &current, &out_dir);
        let final_merge = final_merge_stage(desc, &convert.output, &resource_specs, &out_dir);
        current = final_merge.output.clone();
        stages.push(convert);
        stages.push(final_merge);
    }

    tracing::debug!(
        "planned {} stages for {} ({})",
        stages.len(),
        desc.name,
        desc.variant
    );

    Ok(PipelineOutput {
        stages,
        artifact: current,
        capability: ExportedCapability::new(
            classpath_entry,
            own_classes.into_iter().collect(),
            own_resources,
        ),
    })
}

/// Collect dependencies, build the pipeline and install the archive.
pub fn plan_library(
    ctx: &BuildContext,
    desc: &ModuleDescriptor,
    resolved: &[ResolvedDependency],
    module_type: &str,
) -> Result<ModulePlan, ModuleError> {
    let deps = collect(desc, resolved)?;
    let output = build(ctx, desc, &deps)?;
    let install = archive_install_rule(ctx, &desc.name, desc.variant, &output.artifact);

    Ok(ModulePlan {
        name: desc.name.clone(),
        variant: desc.variant,
        module_type: module_type.to_string(),
        stages: output.stages,
        installs: vec![install],
        artifact: output.artifact,
        classpath: deps.classpath,
        capability: output.capability,
    })
}

/// Install rule for a module archive: `<category>/<name>.<ext>`.
pub(crate) fn archive_install_rule(
    ctx: &BuildContext,
    name: &str,
    variant: Variant,
    artifact: &Path,
) -> InstallRule {
    let file_name = format!("{}.{}", name, ARCHIVE_EXTENSION);
    InstallRule {
        category: FRAMEWORK_CATEGORY.to_string(),
        source: artifact.to_path_buf(),
        destination: ctx.install_path(variant, FRAMEWORK_CATEGORY, &file_name),
        after: None,
    }
}

fn compile_stage(
    ctx: &BuildContext,
    desc: &ModuleDescriptor,
    deps: &CollectedDeps,
    out_dir: &Path,
) -> Result<Option<(PipelineStage, JarSpec)>, ModuleError> {
    if desc.srcs.is_empty() {
        return Ok(None);
    }

    // Each source keeps the root of the pattern that first matched it.
    let mut sources: Vec<(PathBuf, PathBuf)> = Vec::new();
    for pattern in &desc.srcs {
        let root = desc.dir.join(source_root(pattern));
        let matched = ctx
            .tree
            .expand(&desc.dir, std::slice::from_ref(pattern))
            .map_err(|e| ModuleError::stage_failure(&desc.name, "compile", format!("{:#}", e), None))?;
        for src in matched {
            if !sources.iter().any(|(s, _)| *s == src) {
                sources.push((src, root.clone()));
            }
        }
    }

    if sources.is_empty() {
        tracing::warn!("{}: source patterns matched no files", desc.name);
        return Ok(None);
    }

    let mut flags = Vec::new();
    if let Some(boot) = &deps.boot_classpath {
        flags.push(format!("-bootclasspath {}", boot.display()));
    }
    if !deps.classpath.is_empty() {
        flags.push(format!("-classpath {}", ctx.join_classpath(&deps.classpath)));
    }
    flags.extend(desc.compiler_flags.iter().cloned());

    let classes_dir = out_dir.join("classes");
    let entries = sources
        .iter()
        .map(|(src, root)| {
            let rel = relative_path(root, src).with_extension("class");
            let path = archive_path(&rel);
            JarEntry::new(path, classes_dir.join(rel))
        })
        .collect();
    let spec = JarSpec::new(
        format!("{}:classes", desc.name),
        &classes_dir,
        out_dir.join("classes.list"),
    )
    .with_entries(entries);

    let mut depends_on: Vec<String> = boot_dependency(desc).into_iter().collect();
    depends_on.extend(desc.libs.iter().cloned());
    depends_on.extend(desc.static_libs.iter().cloned());

    // The boot entry always leads the collected classpath.
    let mut inputs: Vec<PathBuf> = sources.into_iter().map(|(src, _)| src).collect();
    inputs.extend(deps.classpath.iter().cloned());

    tracing::debug!("{}: compile {} inputs", desc.name, inputs.len());
    let stage = PipelineStage::new(StageKind::Compile, classes_dir)
        .with_inputs(inputs)
        .with_flags(flags.join(" "))
        .with_depends_on(depends_on)
        .with_jar_specs(vec![spec.clone()]);

    Ok(Some((stage, spec)))
}

fn resource_stage(
    ctx: &BuildContext,
    desc: &ModuleDescriptor,
    dir: &str,
    index: usize,
    out_dir: &Path,
) -> Result<(PipelineStage, JarSpec), ModuleError> {
    let root = desc.dir.join(dir);
    let files = ctx.tree.list_files(&root).map_err(|e| {
        ModuleError::stage_failure(&desc.name, "resources", format!("{:#}", e), Some(root.clone()))
    })?;

    let file_list = out_dir.join("res").join(format!("{}.list", index));
    let entries = files
        .iter()
        .map(|rel| JarEntry::new(archive_path(rel), root.join(rel)))
        .collect();
    let spec = JarSpec::new(format!("{}:res/{}", desc.name, dir), &root, &file_list)
        .with_entries(entries);

    let stage = PipelineStage::new(StageKind::PackageResources, file_list)
        .with_inputs(vec![root])
        .with_jar_specs(vec![spec.clone()]);

    Ok((stage, spec))
}

fn merge_stage(
    ctx: &BuildContext,
    desc: &ModuleDescriptor,
    class_specs: &[JarSpec],
    resource_specs: &[JarSpec],
    out_dir: &Path,
) -> Result<PipelineStage, ModuleError> {
    let manifest = desc.manifest.as_ref().map(|m| desc.dir.join(m));
    if let Some(manifest) = &manifest {
        if !ctx.tree.is_file(manifest) {
            return Err(ModuleError::stage_failure(
                &desc.name,
                "merge",
                "manifest file not found",
                Some(manifest.clone()),
            ));
        }
    }

    let all_specs: Vec<JarSpec> = class_specs.iter().chain(resource_specs).cloned().collect();
    let mut inputs: Vec<PathBuf> = all_specs.iter().map(|s| s.file_list.clone()).collect();
    inputs.extend(manifest.iter().cloned());

    Ok(
        PipelineStage::new(StageKind::Merge, out_dir.join("classes-full-debug.jar"))
            .with_inputs(inputs)
            .with_depends_on(desc.static_libs.clone())
            .with_jar_specs(all_specs)
            .with_manifest(manifest),
    )
}

fn rename_stage(
    ctx: &BuildContext,
    desc: &ModuleDescriptor,
    rules: &Path,
    input: &Path,
    out_dir: &Path,
) -> Result<PipelineStage, ModuleError> {
    let rules = desc.dir.join(rules);
    if !ctx.tree.is_file(&rules) {
        return Err(ModuleError::stage_failure(
            &desc.name,
            "rename",
            "rename rule file not found",
            Some(rules),
        ));
    }

    Ok(
        PipelineStage::new(StageKind::Rename, out_dir.join("classes-renamed.jar"))
            .with_inputs(vec![input.to_path_buf(), rules.clone()])
            .with_flags(format!("--rules {}", rules.display())),
    )
}

/// Flags for the convert stage: descriptor flags first, then toggles.
pub fn convert_flags(ctx: &BuildContext, desc: &ModuleDescriptor, out_dir: &Path) -> Vec<String> {
    let mut flags = desc.convert_flags.clone();

    if ctx.toggles.no_optimize {
        flags.push("--no-optimize".to_string());
    }

    if ctx.toggles.debug {
        flags.push("--debug".to_string());
        flags.push("--verbose".to_string());
        flags.push(format!("--dump-to={}", out_dir.join("classes.lst").display()));
        flags.push("--dump-width=1000".to_string());
    }

    flags
}

fn convert_stage(
    ctx: &BuildContext,
    desc: &ModuleDescriptor,
    input: &Path,
    out_dir: &Path,
) -> PipelineStage {
    PipelineStage::new(StageKind::Convert, out_dir.join("classes.dex"))
        .with_inputs(vec![input.to_path_buf()])
        .with_flags(convert_flags(ctx, desc, out_dir).join(" "))
}

fn final_merge_stage(
    desc: &ModuleDescriptor,
    payload: &Path,
    resource_specs: &[JarSpec],
    out_dir: &Path,
) -> PipelineStage {
    let mut inputs = vec![payload.to_path_buf()];
    inputs.extend(resource_specs.iter().map(|s| s.file_list.clone()));

    PipelineStage::new(StageKind::FinalMerge, out_dir.join("javalib.jar"))
        .with_inputs(inputs)
        .with_depends_on(desc.static_libs.clone())
        .with_jar_specs(resource_specs.to_vec())
}

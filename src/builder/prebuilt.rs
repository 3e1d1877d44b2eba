//! Prebuilt modules.
//!
//! A prebuilt wraps one existing archive. Nothing is compiled: the archive
//! is split into a class spec and a resource spec for dependents that merge
//! it, and the archive itself is the classpath entry.

use crate::builder::context::BuildContext;
use crate::builder::pipeline::archive_install_rule;
use crate::builder::plan::{ModulePlan, PipelineStage, StageKind};
use crate::core::capability::ExportedCapability;
use crate::core::descriptor::PrebuiltDescriptor;
use crate::core::error::ModuleError;
use crate::core::jar_spec::JarSpec;

/// Plan a prebuilt module.
pub fn plan_prebuilt(
    ctx: &BuildContext,
    desc: &PrebuiltDescriptor,
) -> Result<ModulePlan, ModuleError> {
    let [src] = desc.srcs.as_slice() else {
        return Err(ModuleError::configuration(
            &desc.name,
            format!("expected exactly one archive in srcs, found {}", desc.srcs.len()),
        ));
    };

    let archive = desc.dir.join(src);
    if !ctx.tree.is_file(&archive) {
        return Err(ModuleError::stage_failure(
            &desc.name,
            "extract",
            "prebuilt archive not found",
            Some(archive),
        ));
    }

    let extract_dir = ctx.module_out_dir(&desc.name, desc.variant).join("extracted");
    let classes = JarSpec::new(
        format!("{}:classes", desc.name),
        extract_dir.join("classes"),
        extract_dir.join("classes.list"),
    );
    let resources = JarSpec::new(
        format!("{}:res", desc.name),
        extract_dir.join("res"),
        extract_dir.join("res.list"),
    );

    let extract = PipelineStage::new(StageKind::ExtractPrebuilt, &extract_dir)
        .with_inputs(vec![archive.clone()])
        .with_jar_specs(vec![classes.clone(), resources.clone()]);

    tracing::debug!("{} ({}): prebuilt {}", desc.name, desc.variant, archive.display());

    Ok(ModulePlan {
        name: desc.name.clone(),
        variant: desc.variant,
        module_type: "prebuilt".to_string(),
        stages: vec![extract],
        installs: vec![archive_install_rule(ctx, &desc.name, desc.variant, &archive)],
        artifact: archive.clone(),
        classpath: Vec::new(),
        capability: ExportedCapability::new(archive, vec![classes], vec![resources]),
    })
}

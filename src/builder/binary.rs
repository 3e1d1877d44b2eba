//! Binary modules: a library plus an installed launcher script.
//!
//! The launcher is ordered after the library's *installed* archive rather
//! than its build output, so nothing can run the launcher before the
//! archive is in place.

use std::path::Path;

use crate::builder::context::{BuildContext, BIN_CATEGORY};
use crate::builder::pipeline::plan_library;
use crate::builder::plan::{InstallRule, ModulePlan};
use crate::core::capability::ResolvedDependency;
use crate::core::descriptor::BinaryDescriptor;
use crate::core::error::ModuleError;

/// Plan the library part of a binary, then add its launcher.
pub fn plan_binary(
    ctx: &BuildContext,
    desc: &BinaryDescriptor,
    resolved: &[ResolvedDependency],
    module_type: &str,
) -> Result<ModulePlan, ModuleError> {
    let plan = plan_library(ctx, &desc.library, resolved, module_type)?;
    decorate(ctx, plan, &desc.library.dir, &desc.wrapper)
}

/// Attach a launcher install rule to a finished library plan.
pub fn decorate(
    ctx: &BuildContext,
    mut plan: ModulePlan,
    module_dir: &Path,
    wrapper: &Path,
) -> Result<ModulePlan, ModuleError> {
    let Some(file_name) = wrapper.file_name().and_then(|n| n.to_str()) else {
        return Err(ModuleError::configuration(
            &plan.name,
            "binary modules need a `wrapper` launcher script",
        ));
    };

    let Some(installed) = plan.installed_artifact().cloned() else {
        return Err(ModuleError::configuration(
            &plan.name,
            "library plan has no installed archive to launch",
        ));
    };

    let script = module_dir.join(wrapper);
    if !ctx.tree.is_file(&script) {
        return Err(ModuleError::stage_failure(
            &plan.name,
            "launcher",
            "launcher script not found",
            Some(script),
        ));
    }

    plan.installs.push(InstallRule {
        category: BIN_CATEGORY.to_string(),
        source: script,
        destination: ctx.install_path(plan.variant, BIN_CATEGORY, file_name),
        after: Some(installed),
    });

    Ok(plan)
}

//! `jarplan plan` command

use anyhow::{bail, Result};

use crate::cli::{GlobalArgs, PlanArgs};
use crate::commands::load_workspace;
use jarplan::ops::{plan_workspace, PlanOptions};
use jarplan::util::diagnostic::emit;
use jarplan::ModuleTypeRegistry;

pub fn execute(global: &GlobalArgs, args: PlanArgs) -> Result<()> {
    let (ws, ctx) = load_workspace(global)?;
    let registry = ModuleTypeRegistry::with_builtin_types();

    let options = PlanOptions {
        variant: args.variant,
        jobs: args.jobs,
    };
    let plan = plan_workspace(&ws, &registry, &ctx, &options)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);

    for failure in &plan.failures {
        emit(&failure.diagnostic, global.color);
    }

    if !plan.is_success() {
        bail!(
            "{} of {} module variants failed to plan",
            plan.failures.len(),
            plan.failures.len() + plan.modules.len()
        );
    }

    tracing::info!("Planned {} module variants", plan.modules.len());
    Ok(())
}

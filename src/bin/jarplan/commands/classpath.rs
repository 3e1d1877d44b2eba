//! `jarplan classpath` command

use anyhow::{bail, Result};

use crate::cli::{ClasspathArgs, GlobalArgs};
use crate::commands::load_workspace;
use jarplan::ops::{plan_workspace, PlanOptions};
use jarplan::util::diagnostic::{emit, suggestions};
use jarplan::ModuleTypeRegistry;

pub fn execute(global: &GlobalArgs, args: ClasspathArgs) -> Result<()> {
    let (ws, ctx) = load_workspace(global)?;
    let registry = ModuleTypeRegistry::with_builtin_types();

    let options = PlanOptions {
        variant: Some(args.variant),
        jobs: None,
    };
    let plan = plan_workspace(&ws, &registry, &ctx, &options)?;

    if let Some(failure) = plan.failure(&args.module, args.variant) {
        emit(&failure.diagnostic, global.color);
        bail!("`{}` ({}) failed to plan", args.module, args.variant);
    }

    let Some(module) = plan.module(&args.module, args.variant) else {
        bail!(
            "module `{}` has no {} variant in this workspace\n{}",
            args.module,
            args.variant,
            suggestions::MODULE_NOT_FOUND
        );
    };

    println!("{}", ctx.join_classpath(&module.classpath));
    Ok(())
}

//! `jarplan deps` command

use anyhow::Result;

use crate::cli::{DepsArgs, GlobalArgs};
use crate::commands::load_workspace;
use jarplan::ops::module_dependencies;
use jarplan::ModuleTypeRegistry;

pub fn execute(global: &GlobalArgs, args: DepsArgs) -> Result<()> {
    let (ws, _) = load_workspace(global)?;
    let registry = ModuleTypeRegistry::with_builtin_types();

    let rows = module_dependencies(&ws, &registry, &args.module, args.variant)?;
    if rows.is_empty() {
        println!("{} ({}) has no dependencies", args.module, args.variant);
        return Ok(());
    }

    println!("{} ({})", args.module, args.variant);
    for row in rows {
        println!("├── {} [{}]", row.name, row.kind);
    }

    Ok(())
}

//! Dependency declaration and collection.
//!
//! A module's dependencies are handled in two passes separated by the
//! build graph's own resolution step:
//! 1. `declare` names what the module needs, before anything is resolved.
//! 2. `collect` classifies what the graph resolved into boot, link-only and
//!    merged dependencies, once those modules have published capabilities.
//!
//! Both passes derive the boot library from the same pure policy in `boot`.

pub mod boot;
pub mod collect;
pub mod declare;

pub use boot::boot_dependency;
pub use collect::{classify, collect, Classification, CollectedDeps};
pub use declare::declare;

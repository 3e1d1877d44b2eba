//! Module-scoped build errors and their diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// An error that aborts planning for one module.
///
/// Every variant names the module it belongs to; errors never leak into
/// unrelated modules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("invalid configuration for `{module}`: {message}")]
    Configuration { module: String, message: String },

    #[error("dependency `{dependency}` of `{module}` is declared in both {first} and {second}")]
    AmbiguousDependency {
        module: String,
        dependency: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("unknown dependency `{dependency}` for `{module}`")]
    UnknownDependency {
        module: String,
        dependency: String,
        reason: String,
    },

    #[error("dependency `{dependency}` of `{module}` is a `{kind}` module and exports no classpath")]
    CapabilityMismatch {
        module: String,
        dependency: String,
        kind: String,
    },

    #[error("{stage} stage failed for `{module}`: {message}")]
    StageFailure {
        module: String,
        stage: &'static str,
        message: String,
        path: Option<PathBuf>,
    },
}

impl ModuleError {
    pub fn configuration(module: impl Into<String>, message: impl Into<String>) -> Self {
        ModuleError::Configuration {
            module: module.into(),
            message: message.into(),
        }
    }

    pub fn stage_failure(
        module: impl Into<String>,
        stage: &'static str,
        message: impl Into<String>,
        path: Option<PathBuf>,
    ) -> Self {
        ModuleError::StageFailure {
            module: module.into(),
            stage,
            message: message.into(),
            path,
        }
    }

    /// Name of the module the error is attributed to.
    pub fn module(&self) -> &str {
        match self {
            ModuleError::Configuration { module, .. }
            | ModuleError::AmbiguousDependency { module, .. }
            | ModuleError::UnknownDependency { module, .. }
            | ModuleError::CapabilityMismatch { module, .. }
            | ModuleError::StageFailure { module, .. } => module,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ModuleError::Configuration { module, message } => {
                Diagnostic::error(format!("invalid configuration for `{}`", module))
                    .with_context(message.clone())
                    .with_suggestion(format!("Fix the `{}` entry in JarPlan.toml", module))
            }

            ModuleError::AmbiguousDependency {
                module,
                dependency,
                first,
                second,
            } => Diagnostic::error(format!(
                "ambiguous dependency `{}` in `{}`",
                dependency, module
            ))
            .with_context(format!("`{}` appears in both {} and {}", dependency, first, second))
            .with_suggestion(format!(
                "Keep `{}` in `libs` to only link against it, or in `static_libs` to merge it",
                dependency
            )),

            ModuleError::UnknownDependency {
                module,
                dependency,
                reason,
            } => Diagnostic::error(format!(
                "unknown dependency `{}` for `{}`",
                dependency, module
            ))
            .with_context(reason.clone())
            .with_suggestion(format!(
                "Declare `{}` in `libs` or `static_libs` of `{}`",
                dependency, module
            )),

            ModuleError::CapabilityMismatch {
                module,
                dependency,
                kind,
            } => Diagnostic::error(format!(
                "`{}` cannot depend on `{}`",
                module, dependency
            ))
            .with_context(format!("`{}` is a `{}` module, not a library", dependency, kind))
            .with_suggestion("Depend on a library or prebuilt module instead".to_string()),

            ModuleError::StageFailure {
                module,
                stage,
                message,
                path,
            } => {
                let mut diag =
                    Diagnostic::error(format!("{} stage failed for `{}`", stage, module))
                        .with_context(message.clone());
                if let Some(path) = path {
                    diag = diag.with_location(path.clone());
                }
                diag
            }
        }
    }
}

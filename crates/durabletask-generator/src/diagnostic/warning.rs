//! Recoverable conditions surfaced alongside a generation result.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use super::Span;
use crate::ir::TaskKind;

/// A condition that made the generator emit less than it was asked to.
///
/// Warnings never fail a pass. They are returned with the outcome, logged
/// through `tracing`, and printed by the CLI.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum GeneratorWarning {
    #[error("Task name for '{declaration}' is not a compile-time constant ({expression}); using '{fallback}'")]
    #[diagnostic(
        code(durabletask::names::non_constant),
        severity(Warning),
        help("Pass a string literal, a nameof() expression or a const string field")
    )]
    NonConstantTaskName {
        declaration: String,
        expression: String,
        fallback: String,
        span: Span,
    },

    #[error("{kind} name '{name}' is declared more than once; skipping '{skipped}'")]
    #[diagnostic(
        code(durabletask::names::duplicate),
        severity(Warning),
        help("Task names must be unique per kind. Rename one of them or override it with [DurableTask(\"...\")]")
    )]
    DuplicateTaskName {
        kind: TaskKind,
        name: String,
        kept: String,
        skipped: String,
    },

    #[error("Task name '{name}' on '{declaration}' is not a valid C# identifier; no wrappers generated")]
    #[diagnostic(
        code(durabletask::names::invalid_identifier),
        severity(Warning),
        help("Generated wrappers embed the task name in method names")
    )]
    InvalidTaskName {
        name: String,
        declaration: String,
    },

    #[error("Syntax errors in {}; declarations in the damaged region may be missed", span.file.display())]
    #[diagnostic(code(durabletask::parse::recovered), severity(Warning))]
    RecoveredSyntaxError {
        span: Span,
    },
}

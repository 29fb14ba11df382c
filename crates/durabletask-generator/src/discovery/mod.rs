//! Discovery of durable task declarations.
//!
//! ```text
//! ParsedFile[] ──scan──▶ Candidate[] ──┬─ attribute ─▶ task name
//!                                      └─ classify ──▶ input/output type expressions
//! ```
//!
//! Scanning is a pure fold over the parsed files and never looks anything up.
//! Name resolution and type classification consult the [`SemanticModel`](crate::semantic::SemanticModel)
//! afterwards, in the driver.

pub mod attribute;
pub mod classify;
pub mod scan;

pub use attribute::{resolve_task_name, ResolvedName};
pub use classify::{classify, render_type_expression, TaskTypes, STANDARD_NAMESPACE, UNTYPED};
pub use scan::{scan, Candidate, FunctionCandidate, TaskCandidate};

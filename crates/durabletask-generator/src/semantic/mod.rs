//! Semantic layer: type resolution and constant evaluation.
//!
//! This stands in for a compiler's semantic model. It is built once per pass
//! from every parsed file plus a catalog of framework types, and answers two
//! questions: what a type reference means, and what string a constant
//! expression evaluates to.

pub mod catalog;
mod constant;
mod model;

pub use model::{ResolutionScope, SemanticModel, TypeSymbol};

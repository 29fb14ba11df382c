//! Diagnostic types for error reporting.

mod error;
mod span;
mod warning;

pub use error::GeneratorError;
pub use span::Span;
pub use warning::GeneratorWarning;

//! Validation of discovered tasks.
//!
//! Validation never fails a pass. Tasks that cannot be emitted are dropped
//! and reported as [`GeneratorWarning`](crate::diagnostic::GeneratorWarning)s.

mod names;

pub use names::{is_valid_identifier, validate_names};

//! Source location tracking.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// A span in a C# source file. Lines and columns are zero-based, as tree-sitter reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub file: PathBuf,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    pub fn new(file: PathBuf, start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            file,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A zero-width span, used for declarations built outside the parser (tests, tools).
    pub fn point(file: impl Into<PathBuf>, line: usize) -> Self {
        Self::new(file.into(), line, 0, line, 0)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file.display(),
            self.start_line + 1,
            self.start_col + 1
        )
    }
}

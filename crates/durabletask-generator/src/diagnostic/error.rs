//! Generator error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a generation pass.
///
/// Everything recoverable (unrecognized declarations, unresolvable types,
/// non-constant task names, name collisions) is reported as a
/// [`GeneratorWarning`](super::GeneratorWarning) instead.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum GeneratorError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access '{path}': {message}")]
    #[diagnostic(code(durabletask::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Source directory not found: {}", path.display())]
    #[diagnostic(
        code(durabletask::io::source_dir_missing),
        help("Point --source at the directory that contains your .cs files")
    )]
    SourceDirNotFound {
        path: PathBuf,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Failed to initialize parser")]
    #[diagnostic(code(durabletask::parse::init_failed))]
    ParserInitFailed,

    #[error("Failed to parse file: {}", path.display())]
    #[diagnostic(code(durabletask::parse::parse_failed))]
    ParseFailed {
        path: PathBuf,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration in '{}': {message}", path.display())]
    #[diagnostic(
        code(durabletask::config::invalid),
        help("Known keys: source_dir, out_dir, project_file, references, language")
    )]
    InvalidConfig {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Frontend Errors
    // =========================================================================
    #[error("Unsupported language: {language}")]
    #[diagnostic(code(durabletask::frontend::unsupported_language))]
    UnsupportedLanguage {
        language: String,
    },
}

impl GeneratorError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }
}

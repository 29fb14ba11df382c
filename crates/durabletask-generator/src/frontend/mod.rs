//! Language frontends for parsing source code into declarations.
//!
//! Each frontend is responsible for:
//! 1. Discovering the source files of a project in its language
//! 2. Parsing them into a declaration-level AST
//!
//! Name resolution and task discovery run on the AST afterwards and do not
//! depend on the parser.

pub mod csharp;

use std::path::{Path, PathBuf};

use crate::diagnostic::GeneratorError;
use csharp::ast::ParsedFile;

/// Trait for language frontends.
pub trait Frontend {
    /// Returns the language name (e.g., "csharp").
    fn language(&self) -> &str;

    /// Returns file extensions this frontend handles (e.g., ["cs"]).
    fn extensions(&self) -> &[&str];

    /// Parses all source files under `dir`, skipping anything below `skip`.
    ///
    /// Files are returned in a stable (sorted) order so that repeated passes
    /// over an unchanged tree produce identical output.
    fn parse_directory(&mut self, dir: &Path, skip: &[PathBuf]) -> Result<Vec<ParsedFile>, GeneratorError>;
}

/// Creates a frontend for the given language.
pub fn create_frontend(language: &str) -> Result<Box<dyn Frontend>, GeneratorError> {
    match language {
        "csharp" | "cs" | "c#" => Ok(Box::new(csharp::CSharpFrontend::new()?)),
        _ => Err(GeneratorError::UnsupportedLanguage {
            language: language.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_frontend() {
        let frontend = create_frontend("csharp").unwrap();
        assert_eq!(frontend.language(), "csharp");
        assert_eq!(frontend.extensions(), &["cs"]);
        assert!(create_frontend("cs").is_ok());
    }

    #[test]
    fn test_unsupported_language() {
        let err = create_frontend("typescript").err().unwrap();
        assert!(matches!(err, GeneratorError::UnsupportedLanguage { .. }));
    }
}

//! C# frontend for the durable task generator.

pub mod ast;
pub mod parser;
pub mod type_syntax;

use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::codegen::GENERATED_FILE_NAME;
use crate::diagnostic::GeneratorError;
use super::Frontend;
use ast::ParsedFile;
use parser::CSharpParser;

/// Build output directories never contain hand-written sources.
const SKIPPED_DIRS: &[&str] = &["bin", "obj"];

/// Suffixes used by other source generators.
const GENERATED_SUFFIXES: &[&str] = &[".g.cs", ".generated.cs"];

/// C# frontend implementation.
pub struct CSharpFrontend {
    parser: CSharpParser,
}

impl CSharpFrontend {
    /// Creates a new C# frontend.
    pub fn new() -> Result<Self, GeneratorError> {
        Ok(Self {
            parser: CSharpParser::new()?,
        })
    }

    /// Parses a single source string. Used by tools and tests.
    pub fn parse_source(&mut self, source: &str, path: &Path) -> Result<ParsedFile, GeneratorError> {
        self.parser.parse(source, path)
    }
}

/// `./obj/x` and `obj/x` name the same directory.
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn is_skipped_dir(entry: &DirEntry, skip: &[PathBuf]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
        return true;
    }
    let path = without_cur_dir(entry.path());
    skip.iter().any(|dir| path.starts_with(without_cur_dir(dir)))
}

fn is_generated_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name == GENERATED_FILE_NAME || GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

impl Frontend for CSharpFrontend {
    fn language(&self) -> &str {
        "csharp"
    }

    fn extensions(&self) -> &[&str] {
        &["cs"]
    }

    fn parse_directory(&mut self, dir: &Path, skip: &[PathBuf]) -> Result<Vec<ParsedFile>, GeneratorError> {
        if !dir.is_dir() {
            return Err(GeneratorError::SourceDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut parsed_files = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e, skip))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_generated_file(path) {
                continue;
            }
            let Some(ext) = path.extension() else { continue };
            if !self.extensions().contains(&ext.to_string_lossy().as_ref()) {
                continue;
            }

            let source = std::fs::read_to_string(path)
                .map_err(|e| GeneratorError::io(path, e.to_string()))?;

            tracing::trace!(path = %path.display(), "parsing source file");
            parsed_files.push(self.parser.parse(&source, path)?);
        }

        tracing::debug!(dir = %dir.display(), files = parsed_files.len(), "parsed source directory");
        Ok(parsed_files)
    }
}

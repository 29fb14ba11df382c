//! # Durable Task Generator
//!
//! This crate scans C# sources for durable task declarations and generates a
//! single file of typed extension methods for them, so orchestrations and
//! activities can be scheduled and called without string-keyed call sites.
//!
//! Two kinds of declaration are recognized:
//!
//! - classes deriving from `TaskOrchestrator<TInput, TOutput>` or
//!   `TaskActivity<TInput, TOutput>` (optionally renamed with `[DurableTask("...")]`)
//! - methods marked `[Function("...")]` with an `[ActivityTrigger]` parameter
//!
//! ## Architecture
//!
//! ```text
//! .cs files + .csproj
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  tree-sitter → declaration AST
//! │  (C# → AST)  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Semantic   │  type and constant resolution
//! │    model     │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Discovery   │  scan → candidates → descriptors
//! │  + validate  │  (names, types, duplicates)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  plan → C# text (+ content hash)
//! │ (IR → C#)    │
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use durabletask_generator::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig {
//!     source_dir: "src/Orders".into(),
//!     ..GeneratorConfig::default()
//! };
//!
//! let result = Generator::new(config).generate()?;
//! println!("{:?}: {}", result.status, result.output_path.display());
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod discovery;
pub mod driver;
pub mod frontend;
pub mod ir;
pub mod project;
pub mod semantic;
pub mod validate;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use codegen::GeneratedArtifact;
pub use config::GeneratorConfig;
pub use diagnostic::{GeneratorError, GeneratorWarning};
pub use ir::{DiscoveredTasks, GenerationMode};
pub use project::ProjectInfo;

use semantic::SemanticModel;

/// The main generator struct that runs the generation pipeline.
pub struct Generator {
    config: GeneratorConfig,
}

/// What happened to the generated file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    /// New or changed content was written.
    Written,
    /// The file already had identical content.
    Unchanged,
    /// Nothing was discovered; a stale file was deleted.
    Removed,
    /// Nothing was discovered and there was nothing to delete.
    Skipped,
}

/// Everything one pass found, without touching the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub project: ProjectInfo,
    /// Number of source files parsed.
    pub files: usize,
    pub tasks: DiscoveredTasks,
    pub mode: GenerationMode,
    pub warnings: Vec<GeneratorWarning>,
    #[serde(skip)]
    pub artifact: Option<GeneratedArtifact>,
}

/// Result of a generation pass.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub orchestrators: usize,
    pub activities: usize,
    pub functions: usize,
    pub mode: GenerationMode,
    pub output_path: PathBuf,
    pub content_hash: Option<String>,
    pub status: WriteStatus,
    pub warnings: Vec<GeneratorWarning>,
}

impl Generator {
    /// Creates a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Runs discovery and code generation in memory.
    ///
    /// This runs the pipeline up to the artifact:
    /// 1. Read the project file (references, implicit usings)
    /// 2. Parse the source directory
    /// 3. Build the semantic model
    /// 4. Scan for candidates
    /// 5. Describe, validate and render
    pub fn analyze(&self) -> Result<Analysis, GeneratorError> {
        // Phase 1: Project file
        let project = ProjectInfo::locate(self.config.project_file.as_deref(), &self.config.source_dir)?;

        // Phase 2: Parse
        let mut frontend = frontend::create_frontend(&self.config.language)?;
        let files = frontend.parse_directory(&self.config.source_dir, std::slice::from_ref(&self.config.out_dir))?;

        let mut warnings: Vec<GeneratorWarning> = files
            .iter()
            .filter_map(|file| file.syntax_error.clone())
            .map(|span| GeneratorWarning::RecoveredSyntaxError { span })
            .collect();
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        // Phase 3: Semantic model
        let model = SemanticModel::build(&files, &project.implicit_namespaces());

        // Phase 4: Scan
        let candidates = discovery::scan(&files);
        tracing::debug!(files = files.len(), candidates = candidates.len(), "scanned sources");

        // Phase 5: Descriptors and artifact
        let mut modules = project.referenced_modules.clone();
        modules.extend(self.config.references.iter().cloned());
        let outcome = driver::run(&candidates, &model, &modules);
        warnings.extend(outcome.warnings);

        Ok(Analysis {
            project,
            files: files.len(),
            tasks: outcome.tasks,
            mode: outcome.mode,
            warnings,
            artifact: outcome.artifact,
        })
    }

    /// Runs the full pipeline and updates the generated file on disk.
    pub fn generate(&self) -> Result<GenerateResult, GeneratorError> {
        let analysis = self.analyze()?;
        let output_path = self.config.output_path();
        let status = write_artifact(&output_path, analysis.artifact.as_ref())?;

        tracing::info!(
            path = %display_path(&output_path).display(),
            ?status,
            "generation pass complete"
        );

        Ok(GenerateResult {
            orchestrators: analysis.tasks.orchestrators.len(),
            activities: analysis.tasks.activities.len(),
            functions: analysis.tasks.functions.len(),
            mode: analysis.mode,
            output_path: display_path(&output_path),
            content_hash: analysis.artifact.map(|a| a.content_hash),
            status,
            warnings: analysis.warnings,
        })
    }

    /// Discovers tasks without writing anything.
    pub fn check(&self) -> Result<Analysis, GeneratorError> {
        self.analyze()
    }
}

/// Writes, keeps or removes the generated file.
fn write_artifact(path: &Path, artifact: Option<&GeneratedArtifact>) -> Result<WriteStatus, GeneratorError> {
    let Some(artifact) = artifact else {
        if path.is_file() {
            std::fs::remove_file(path).map_err(|e| GeneratorError::io(path, e.to_string()))?;
            return Ok(WriteStatus::Removed);
        }
        return Ok(WriteStatus::Skipped);
    };

    if let Ok(existing) = std::fs::read_to_string(path) {
        if codegen::content_hash(&existing) == artifact.content_hash {
            return Ok(WriteStatus::Unchanged);
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e.to_string()))?;
    }
    std::fs::write(path, &artifact.text).map_err(|e| GeneratorError::io(path, e.to_string()))?;
    Ok(WriteStatus::Written)
}

/// `path` relative to the working directory when possible.
pub fn display_path(path: &Path) -> PathBuf {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_artifact_lifecycle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join(codegen::GENERATED_FILE_NAME);
        let artifact = GeneratedArtifact::new(codegen::GENERATED_FILE_NAME, "// generated\n".to_string());

        assert_eq!(write_artifact(&path, Some(&artifact)).unwrap(), WriteStatus::Written);
        assert_eq!(write_artifact(&path, Some(&artifact)).unwrap(), WriteStatus::Unchanged);

        let changed = GeneratedArtifact::new(codegen::GENERATED_FILE_NAME, "// changed\n".to_string());
        assert_eq!(write_artifact(&path, Some(&changed)).unwrap(), WriteStatus::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "// changed\n");

        assert_eq!(write_artifact(&path, None).unwrap(), WriteStatus::Removed);
        assert!(!path.exists());
        assert_eq!(write_artifact(&path, None).unwrap(), WriteStatus::Skipped);
    }
}

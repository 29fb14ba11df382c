//! Generator configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostic::GeneratorError;

/// File name looked up in the working directory when no config path is given.
pub const CONFIG_FILE_NAME: &str = "durabletask.toml";

/// Configuration for the durable task generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory containing the C# sources (default: ".").
    pub source_dir: PathBuf,

    /// Directory the generated file is written to (default: "obj/generated").
    pub out_dir: PathBuf,

    /// Project file to read references from. Defaults to the first `*.csproj` in `source_dir`.
    pub project_file: Option<PathBuf>,

    /// Extra referenced module names, added to those of the project file.
    pub references: Vec<String>,

    /// Source language (default: "csharp").
    pub language: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            out_dir: PathBuf::from("obj/generated"),
            project_file: None,
            references: Vec::new(),
            language: "csharp".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Loads a TOML config file. Relative paths in it are taken relative to the file.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let text = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e.to_string()))?;
        let config: GeneratorConfig = toml::from_str(&text).map_err(|e| GeneratorError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "loaded generator config");
        match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => Ok(config.rebase(base)),
            _ => Ok(config),
        }
    }

    /// Loads `durabletask.toml` from `dir` if present, else returns the defaults.
    pub fn load_or_default(dir: &Path) -> Result<Self, GeneratorError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Makes relative paths relative to `base`.
    pub fn rebase(mut self, base: &Path) -> Self {
        let join = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        self.source_dir = join(&self.source_dir);
        self.out_dir = join(&self.out_dir);
        self.project_file = self.project_file.as_deref().map(join);
        self
    }

    /// Path of the generated file.
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(crate::codegen::GENERATED_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.source_dir, PathBuf::from("."));
        assert_eq!(config.language, "csharp");
        assert_eq!(
            config.output_path(),
            PathBuf::from("obj/generated/GeneratedDurableTaskExtensions.cs")
        );
    }

    #[test]
    fn test_load_rebases_relative_paths() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
source_dir = "src"
references = ["Microsoft.Azure.Functions.Worker.Extensions.DurableTask"]
"#,
        )
        .unwrap();

        let config = GeneratorConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.source_dir, dir.path().join("src"));
        assert_eq!(config.out_dir, dir.path().join("obj/generated"));
        assert_eq!(config.references.len(), 1);
        assert_eq!(config.project_file, None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "sourcedir = \"src\"\n").unwrap();

        let err = GeneratorConfig::load(&path).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidConfig { .. }));
    }
}

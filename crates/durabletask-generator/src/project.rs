//! Reading referenced modules out of a `.csproj` file.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::diagnostic::GeneratorError;

/// Namespaces the .NET SDK imports into every file when `<ImplicitUsings>` is on.
pub const IMPLICIT_USINGS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.IO",
    "System.Linq",
    "System.Net.Http",
    "System.Threading",
    "System.Threading.Tasks",
];

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(PackageReference|Reference|ProjectReference)\b[^>]*?\bInclude\s*=\s*"([^"]+)""#)
        .expect("reference pattern is valid")
});

static IMPLICIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<ImplicitUsings>\s*([a-z]+)\s*</ImplicitUsings>").expect("implicit usings pattern is valid")
});

/// What the generator needs from a project file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectInfo {
    /// The project file, if one was found.
    pub path: Option<PathBuf>,
    /// Package, assembly and project reference names, in file order.
    pub referenced_modules: Vec<String>,
    pub implicit_usings: bool,
}

impl ProjectInfo {
    /// Reads a project file.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let text = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e.to_string()))?;
        let mut info = Self::parse(&text);
        info.path = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            references = info.referenced_modules.len(),
            implicit_usings = info.implicit_usings,
            "read project file"
        );
        Ok(info)
    }

    /// Loads `explicit` if given, else the first `*.csproj` (by name) directly in `source_dir`.
    /// A source directory without a project file yields an empty project.
    pub fn locate(explicit: Option<&Path>, source_dir: &Path) -> Result<Self, GeneratorError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match find_project_file(source_dir)? {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Extracts references and the implicit-usings switch from project XML.
    pub fn parse(text: &str) -> Self {
        let referenced_modules = REFERENCE
            .captures_iter(text)
            .map(|caps| {
                let include = caps[2].trim();
                match &caps[1] {
                    // `Name, Version=..., Culture=...`
                    "Reference" => include.split(',').next().unwrap_or(include).trim().to_string(),
                    "ProjectReference" => project_stem(include),
                    _ => include.to_string(),
                }
            })
            .filter(|name| !name.is_empty())
            .collect();

        let implicit_usings = IMPLICIT
            .captures(text)
            .map(|caps| matches!(caps[1].to_ascii_lowercase().as_str(), "enable" | "true"))
            .unwrap_or(false);

        Self {
            path: None,
            referenced_modules,
            implicit_usings,
        }
    }

    /// Namespaces imported into every file of the project.
    pub fn implicit_namespaces(&self) -> Vec<String> {
        if self.implicit_usings {
            IMPLICIT_USINGS.iter().map(|ns| ns.to_string()).collect()
        } else {
            Vec::new()
        }
    }
}

/// `..\Shared\Shared.csproj` -> `Shared`
fn project_stem(include: &str) -> String {
    let file = include.rsplit(['/', '\\']).next().unwrap_or(include);
    file.rsplit_once('.').map_or(file, |(stem, _)| stem).to_string()
}

fn find_project_file(dir: &Path) -> Result<Option<PathBuf>, GeneratorError> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let entries = std::fs::read_dir(dir).map_err(|e| GeneratorError::io(dir, e.to_string()))?;
    let mut projects: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csproj"))
        .collect();
    projects.sort();
    Ok(projects.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const FUNCTIONS_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <ImplicitUsings>Enable</ImplicitUsings>
    <Nullable>enable</Nullable>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Microsoft.Azure.Functions.Worker" Version="1.21.0" />
    <PackageReference Version="1.1.1" Include="Microsoft.Azure.Functions.Worker.Extensions.DurableTask" />
    <Reference Include="Legacy.Assembly, Version=1.0.0.0, Culture=neutral" />
    <ProjectReference Include="..\Shared\Shared.Models.csproj" />
  </ItemGroup>
</Project>
"#;

    #[test]
    fn test_parse_references() {
        let info = ProjectInfo::parse(FUNCTIONS_PROJECT);
        assert_eq!(
            info.referenced_modules,
            vec![
                "Microsoft.Azure.Functions.Worker".to_string(),
                "Microsoft.Azure.Functions.Worker.Extensions.DurableTask".to_string(),
                "Legacy.Assembly".to_string(),
                "Shared.Models".to_string(),
            ]
        );
        assert!(info.implicit_usings);
        assert_eq!(info.implicit_namespaces().len(), IMPLICIT_USINGS.len());
    }

    #[test]
    fn test_implicit_usings_off() {
        let info = ProjectInfo::parse("<Project><PropertyGroup><ImplicitUsings>disable</ImplicitUsings></PropertyGroup></Project>");
        assert!(!info.implicit_usings);
        assert!(info.implicit_namespaces().is_empty());
        assert!(ProjectInfo::parse("<Project />").referenced_modules.is_empty());
    }

    #[test]
    fn test_locate_first_project_by_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("B.csproj"), "<Project><ItemGroup><PackageReference Include=\"B.Package\" /></ItemGroup></Project>").unwrap();
        fs::write(dir.path().join("A.csproj"), "<Project><ItemGroup><PackageReference Include=\"A.Package\" /></ItemGroup></Project>").unwrap();

        let info = ProjectInfo::locate(None, dir.path()).unwrap();
        assert_eq!(info.path, Some(dir.path().join("A.csproj")));
        assert_eq!(info.referenced_modules, vec!["A.Package".to_string()]);
    }

    #[test]
    fn test_locate_without_project() {
        let dir = tempdir().unwrap();
        assert_eq!(ProjectInfo::locate(None, dir.path()).unwrap(), ProjectInfo::default());
    }

    #[test]
    fn test_missing_explicit_project_is_an_error() {
        let dir = tempdir().unwrap();
        let err = ProjectInfo::locate(Some(&dir.path().join("Missing.csproj")), dir.path()).unwrap_err();
        assert!(matches!(err, GeneratorError::IoError { .. }));
    }
}

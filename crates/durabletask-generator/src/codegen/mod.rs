//! C# code generation from discovered tasks.
//!
//! Generation happens in two steps. [`plan::build`] turns the descriptor lists
//! and the generation mode into a [`plan::GeneratedUnit`]: an ordered list of
//! members to emit. [`render::render`] then prints the unit in one pass. All
//! mode-dependent decisions live in the plan, so the renderer is a set of
//! fixed templates.

pub mod plan;
pub mod render;

use sha2::{Digest, Sha256};

use crate::ir::{DiscoveredTasks, GenerationMode};

/// Name of the generated source file.
pub const GENERATED_FILE_NAME: &str = "GeneratedDurableTaskExtensions.cs";

/// Namespace of the generated extension class.
pub const GENERATED_NAMESPACE: &str = "Microsoft.DurableTask";

/// Name of the generated extension class.
pub const GENERATED_CLASS_NAME: &str = "GeneratedDurableTaskExtensions";

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub file_name: String,
    pub text: String,
    /// `sha256:<hex>` of `text`.
    pub content_hash: String,
}

impl GeneratedArtifact {
    pub fn new(file_name: impl Into<String>, text: String) -> Self {
        let content_hash = content_hash(&text);
        Self {
            file_name: file_name.into(),
            text,
            content_hash,
        }
    }
}

/// Computes the content hash of generated text.
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{:02x}", byte)).collect();
    format!("sha256:{}", hex)
}

/// Generates the extension source for `tasks`. Returns `None` when there is nothing to emit.
pub fn generate(tasks: &DiscoveredTasks, mode: GenerationMode) -> Option<GeneratedArtifact> {
    if tasks.is_empty() {
        return None;
    }
    let unit = plan::build(tasks, mode);
    Some(GeneratedArtifact::new(GENERATED_FILE_NAME, render::render(&unit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_format() {
        let hash = content_hash("");
        assert_eq!(
            hash,
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    #[test]
    fn test_nothing_to_generate() {
        assert!(generate(&DiscoveredTasks::default(), GenerationMode::Standalone).is_none());
        assert!(generate(&DiscoveredTasks::default(), GenerationMode::HostIntegrated).is_none());
    }
}

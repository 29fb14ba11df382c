//! Task name checks: identifier validity and uniqueness per kind.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::diagnostic::GeneratorWarning;
use crate::ir::{DiscoveredTasks, TaskDescriptor, TaskKind};

/// Reserved C# keywords. Contextual keywords are valid identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Whether `name` can be used as a C# method name.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

/// Tracks the first declaration seen for each name of one kind.
struct NameRegistry {
    kind: TaskKind,
    seen: HashMap<String, String>,
}

impl NameRegistry {
    fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            seen: HashMap::new(),
        }
    }

    /// Returns whether the declaration may be emitted, pushing a warning if not.
    fn admit(&mut self, name: &str, declaration: &str, warnings: &mut Vec<GeneratorWarning>) -> bool {
        if !is_valid_identifier(name) {
            warnings.push(GeneratorWarning::InvalidTaskName {
                name: name.to_string(),
                declaration: declaration.to_string(),
            });
            return false;
        }

        match self.seen.entry(name.to_string()) {
            Entry::Occupied(kept) => {
                warnings.push(GeneratorWarning::DuplicateTaskName {
                    kind: self.kind,
                    name: name.to_string(),
                    kept: kept.get().clone(),
                    skipped: declaration.to_string(),
                });
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(declaration.to_string());
                true
            }
        }
    }
}

/// Drops tasks whose names are invalid or already taken within their kind.
///
/// Structural activities and activity functions share one name space. The
/// first declaration in discovery order keeps a contested name.
pub fn validate_names(tasks: DiscoveredTasks) -> (DiscoveredTasks, Vec<GeneratorWarning>) {
    let mut warnings = Vec::new();
    let mut valid = DiscoveredTasks::default();

    let mut orchestrators = NameRegistry::new(TaskKind::Orchestrator);
    let mut activities = NameRegistry::new(TaskKind::Activity);

    let admit_task = |registry: &mut NameRegistry, task: &TaskDescriptor, warnings: &mut Vec<GeneratorWarning>| {
        registry.admit(&task.task_name, &task.declared_type_name, warnings)
    };

    for task in tasks.orchestrators {
        if admit_task(&mut orchestrators, &task, &mut warnings) {
            valid.orchestrators.push(task);
        }
    }
    for task in tasks.activities {
        if admit_task(&mut activities, &task, &mut warnings) {
            valid.activities.push(task);
        }
    }
    for function in tasks.functions {
        if activities.admit(&function.name, &function.declared_in, &mut warnings) {
            valid.functions.push(function);
        }
    }

    (valid, warnings)
}

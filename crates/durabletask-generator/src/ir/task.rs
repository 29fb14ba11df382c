//! Task and function descriptors.

use std::fmt;

use serde::Serialize;

use crate::diagnostic::Span;

/// The two kinds of durable task a declaration can implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Orchestrator,
    Activity,
}

/// Generic base types that mark a class as a durable task.
const RECOGNIZED_BASES: &[(&str, TaskKind)] = &[
    ("TaskOrchestrator", TaskKind::Orchestrator),
    ("TaskActivity", TaskKind::Activity),
];

impl TaskKind {
    /// Maps the simple name of a generic base type to the kind it declares.
    pub fn from_base_name(name: &str) -> Option<Self> {
        RECOGNIZED_BASES
            .iter()
            .find(|(base, _)| *base == name)
            .map(|(_, kind)| *kind)
    }

    /// The name of the generic base type for this kind.
    pub fn base_name(self) -> &'static str {
        RECOGNIZED_BASES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(base, _)| *base)
            .unwrap_or_default()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Orchestrator => f.write_str("Orchestrator"),
            TaskKind::Activity => f.write_str("Activity"),
        }
    }
}

/// Where a task name came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum NameSource {
    /// The declared identifier of the class or method.
    Declared,
    /// A constant argument of the marker attribute.
    Attribute,
    /// The marker attribute had a non-constant argument; the declared identifier was used.
    NonConstantFallback { expression: String, span: Span },
}

/// A structurally recognized orchestrator or activity class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDescriptor {
    pub kind: TaskKind,
    /// Fully qualified name of the implementing class.
    pub declared_type_name: String,
    /// Name used to address the task at invocation time.
    pub task_name: String,
    pub name_source: NameSource,
    pub input_type: String,
    /// Nullable-qualified input type, usable with a `default` parameter value.
    pub input_default_type: String,
    pub output_type: String,
    pub span: Span,
}

/// The bound input parameter of an activity function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionParameter {
    pub name: String,
    pub type_expr: String,
}

impl fmt::Display for FunctionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_expr, self.name)
    }
}

/// An attribute-annotated activity function (`[Function]` + `[ActivityTrigger]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub name_source: NameSource,
    pub return_type: String,
    pub parameter: FunctionParameter,
    /// Declaring method, as `Namespace.Type.Method`.
    pub declared_in: String,
    pub span: Span,
}

/// Everything discovered in one pass, partitioned by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveredTasks {
    pub orchestrators: Vec<TaskDescriptor>,
    pub activities: Vec<TaskDescriptor>,
    pub functions: Vec<FunctionDescriptor>,
}

impl DiscoveredTasks {
    /// Total number of tasks that will receive wrappers.
    pub fn len(&self) -> usize {
        self.orchestrators.len() + self.activities.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a descriptor to the list for its kind.
    pub fn push_task(&mut self, task: TaskDescriptor) {
        match task.kind {
            TaskKind::Orchestrator => self.orchestrators.push(task),
            TaskKind::Activity => self.activities.push(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_lookup() {
        assert_eq!(TaskKind::from_base_name("TaskOrchestrator"), Some(TaskKind::Orchestrator));
        assert_eq!(TaskKind::from_base_name("TaskActivity"), Some(TaskKind::Activity));
        assert_eq!(TaskKind::from_base_name("TaskActivityBase"), None);
        assert_eq!(TaskKind::from_base_name("taskactivity"), None);
    }

    #[test]
    fn test_base_name_roundtrip() {
        for kind in [TaskKind::Orchestrator, TaskKind::Activity] {
            assert_eq!(TaskKind::from_base_name(kind.base_name()), Some(kind));
        }
    }

    #[test]
    fn test_function_parameter_display() {
        let param = FunctionParameter {
            name: "city".to_string(),
            type_expr: "string".to_string(),
        };
        assert_eq!(param.to_string(), "string city");
    }
}

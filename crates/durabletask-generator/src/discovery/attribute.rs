//! Attribute matching and task-name overrides.

use crate::frontend::csharp::ast::AttributeDecl;
use crate::ir::NameSource;
use crate::semantic::{ResolutionScope, SemanticModel};

/// An attribute type the generator recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeType {
    pub namespace: &'static str,
    /// Simple name without the `Attribute` suffix.
    pub name: &'static str,
}

/// `[DurableTask("name")]`: overrides the task name of a task class.
pub const DURABLE_TASK_ATTRIBUTE: AttributeType = AttributeType {
    namespace: "Microsoft.DurableTask",
    name: "DurableTask",
};

/// `[Function("name")]`: declares a host function.
pub const FUNCTION_ATTRIBUTE: AttributeType = AttributeType {
    namespace: "Microsoft.Azure.Functions.Worker",
    name: "Function",
};

/// `[ActivityTrigger]`: binds an activity's input parameter.
pub const ACTIVITY_TRIGGER_ATTRIBUTE: AttributeType = AttributeType {
    namespace: "Microsoft.Azure.Functions.Worker",
    name: "ActivityTrigger",
};

impl AttributeType {
    /// Whether an attribute name as written refers to this type.
    ///
    /// Accepts the simple name with or without the `Attribute` suffix, optionally
    /// qualified by this type's namespace (and `global::`).
    pub fn matches(&self, written: &str) -> bool {
        let written = written.strip_prefix("global::").unwrap_or(written);
        let (namespace, simple) = match written.rsplit_once('.') {
            Some((namespace, simple)) => (Some(namespace), simple),
            None => (None, written),
        };
        if namespace.is_some_and(|ns| ns != self.namespace) {
            return false;
        }
        simple == self.name || simple.strip_suffix("Attribute") == Some(self.name)
    }
}

/// The effective name of a task and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedName {
    pub name: String,
    pub source: NameSource,
}

/// The argument bound to the attribute's `name` constructor parameter.
fn name_argument(attribute: &AttributeDecl) -> Option<&str> {
    attribute
        .first_positional()
        .or_else(|| attribute.arguments.iter().find(|a| a.name.as_deref() == Some("name")))
        .map(|a| a.expression.as_str())
}

/// Resolves the effective task name of a declaration.
///
/// Attributes are tried in declaration order. The first one of type `marker`
/// that carries a name argument decides: a constant argument becomes the name,
/// a non-constant one falls back to `declared` and is recorded as
/// [`NameSource::NonConstantFallback`]. Without such an attribute the declared
/// identifier is used.
pub fn resolve_task_name(
    attributes: &[AttributeDecl],
    marker: AttributeType,
    declared: &str,
    scope: &ResolutionScope,
    model: &SemanticModel,
) -> ResolvedName {
    for attribute in attributes.iter().filter(|a| marker.matches(&a.name)) {
        let Some(expression) = name_argument(attribute) else {
            continue;
        };

        return match model.evaluate_constant(expression, scope) {
            Some(name) => ResolvedName {
                name,
                source: NameSource::Attribute,
            },
            None => ResolvedName {
                name: declared.to_string(),
                source: NameSource::NonConstantFallback {
                    expression: expression.to_string(),
                    span: attribute.span.clone(),
                },
            },
        };
    }

    ResolvedName {
        name: declared.to_string(),
        source: NameSource::Declared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Span;
    use crate::frontend::csharp::ast::AttributeArgument;

    fn attribute(name: &str, args: &[(Option<&str>, &str)]) -> AttributeDecl {
        AttributeDecl {
            name: name.to_string(),
            arguments: args
                .iter()
                .map(|(n, e)| AttributeArgument {
                    name: n.map(str::to_string),
                    expression: e.to_string(),
                })
                .collect(),
            span: Span::point("Tasks.cs", 3),
        }
    }

    fn resolve(attributes: &[AttributeDecl]) -> ResolvedName {
        let model = SemanticModel::build(&[], &[]);
        resolve_task_name(
            attributes,
            DURABLE_TASK_ATTRIBUTE,
            "SayHello",
            &ResolutionScope::global(),
            &model,
        )
    }

    #[test]
    fn test_marker_matching() {
        assert!(DURABLE_TASK_ATTRIBUTE.matches("DurableTask"));
        assert!(DURABLE_TASK_ATTRIBUTE.matches("DurableTaskAttribute"));
        assert!(DURABLE_TASK_ATTRIBUTE.matches("Microsoft.DurableTask.DurableTask"));
        assert!(DURABLE_TASK_ATTRIBUTE.matches("global::Microsoft.DurableTask.DurableTaskAttribute"));
        assert!(!DURABLE_TASK_ATTRIBUTE.matches("Other.DurableTask"));
        assert!(!DURABLE_TASK_ATTRIBUTE.matches("DurableTaskName"));
        assert!(FUNCTION_ATTRIBUTE.matches("Function"));
        assert!(ACTIVITY_TRIGGER_ATTRIBUTE.matches("ActivityTriggerAttribute"));
        assert!(!ACTIVITY_TRIGGER_ATTRIBUTE.matches("OrchestrationTrigger"));
    }

    #[test]
    fn test_no_attribute_uses_declared_name() {
        let resolved = resolve(&[attribute("Serializable", &[])]);
        assert_eq!(resolved.name, "SayHello");
        assert_eq!(resolved.source, NameSource::Declared);
    }

    #[test]
    fn test_constant_override() {
        let resolved = resolve(&[attribute("DurableTask", &[(None, "\"Greet\"")])]);
        assert_eq!(resolved.name, "Greet");
        assert_eq!(resolved.source, NameSource::Attribute);

        let resolved = resolve(&[attribute("DurableTask", &[(Some("name"), "nameof(Greeter)")])]);
        assert_eq!(resolved.name, "Greeter");
    }

    #[test]
    fn test_first_matching_attribute_wins() {
        let resolved = resolve(&[
            attribute("DurableTask", &[]),
            attribute("DurableTask", &[(None, "\"First\"")]),
            attribute("DurableTask", &[(None, "\"Second\"")]),
        ]);
        assert_eq!(resolved.name, "First");
    }

    #[test]
    fn test_non_constant_falls_back() {
        let resolved = resolve(&[
            attribute("DurableTask", &[(None, "GetName()")]),
            attribute("DurableTask", &[(None, "\"Later\"")]),
        ]);
        assert_eq!(resolved.name, "SayHello");
        assert_eq!(
            resolved.source,
            NameSource::NonConstantFallback {
                expression: "GetName()".to_string(),
                span: Span::point("Tasks.cs", 3),
            }
        );
    }
}

//! Type classification: from generic type arguments to rendered type expressions.

use crate::frontend::csharp::type_syntax::{TypeArg, TypeSyntax};
use crate::semantic::{ResolutionScope, SemanticModel, TypeSymbol};

/// The only namespace whose prefix is stripped from rendered types.
pub const STANDARD_NAMESPACE: &str = "System";

/// Rendered for missing or unresolvable types.
pub const UNTYPED: &str = "object";

/// Rendered type expressions of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTypes {
    pub input: String,
    /// Nullable-qualified input, usable as `input = default`.
    pub input_default: String,
    pub output: String,
}

/// Classifies the type arguments of a task base (`<TInput, TOutput>`).
///
/// Missing, omitted or unresolvable arguments render as [`UNTYPED`].
pub fn classify(type_args: &[Option<TypeSyntax>], scope: &ResolutionScope, model: &SemanticModel) -> TaskTypes {
    let resolve = |index: usize| {
        type_args
            .get(index)
            .and_then(Option::as_ref)
            .and_then(|ty| model.resolve_type(ty, scope))
    };
    let input = resolve(0);
    let output = resolve(1);

    TaskTypes {
        input: render_type_expression(input.as_ref(), false),
        input_default: render_type_expression(input.as_ref(), true),
        output: render_type_expression(output.as_ref(), false),
    }
}

/// Renders a resolved type as source text.
///
/// `default_capable` adds a nullable qualifier unless the type already has one.
/// The `System.` prefix is dropped when the type lives directly in [`STANDARD_NAMESPACE`].
pub fn render_type_expression(symbol: Option<&TypeSymbol>, default_capable: bool) -> String {
    let Some(symbol) = symbol else {
        return if default_capable {
            format!("{}?", UNTYPED)
        } else {
            UNTYPED.to_string()
        };
    };

    let symbol = if default_capable {
        symbol.clone().into_nullable()
    } else {
        symbol.clone()
    };

    if symbol.containing_namespace.as_deref() == Some(STANDARD_NAMESPACE) {
        if let Some(short) = symbol.display.strip_prefix(STANDARD_NAMESPACE).and_then(|s| s.strip_prefix('.')) {
            return short.to_string();
        }
    }
    symbol.display
}

/// The result type of an activity function, with `Task<T>`/`ValueTask<T>` unwrapped.
///
/// Works on the text as written; `void`, `Task` and `ValueTask` become [`UNTYPED`].
pub fn function_return_type(written: &str) -> String {
    let Ok(ty) = TypeSyntax::parse(written) else {
        return written.trim().to_string();
    };

    match &ty {
        TypeSyntax::Predefined(keyword) if keyword == "void" => UNTYPED.to_string(),
        TypeSyntax::Named(name) => {
            let last = name.last();
            if last.name != "Task" && last.name != "ValueTask" {
                return ty.to_string();
            }
            match last.type_args.as_deref() {
                None => UNTYPED.to_string(),
                Some([TypeArg::Type(inner)]) => inner.to_string(),
                Some(_) => ty.to_string(),
            }
        }
        _ => ty.to_string(),
    }
}

//! Syntax scanning: finds task candidates without resolving anything.

use crate::frontend::csharp::ast::{AttributeDecl, MethodDecl, ParameterDecl, ParsedFile, TypeDecl};
use crate::frontend::csharp::type_syntax::{TypeArg, TypeSyntax};
use crate::ir::TaskKind;
use super::attribute::{ACTIVITY_TRIGGER_ATTRIBUTE, FUNCTION_ATTRIBUTE};

/// A declaration that looks like a durable task.
#[derive(Debug, Clone)]
pub enum Candidate<'a> {
    /// A class deriving from a recognized generic task base.
    Task(TaskCandidate<'a>),
    /// A method annotated as an activity function.
    Function(FunctionCandidate<'a>),
}

/// A class matched by the structural rule.
#[derive(Debug, Clone)]
pub struct TaskCandidate<'a> {
    pub kind: TaskKind,
    pub file: &'a ParsedFile,
    pub decl: &'a TypeDecl,
    /// Type arguments of the matched base, in order. Omitted arguments (`<>`) are `None`.
    pub type_args: Vec<Option<TypeSyntax>>,
}

/// A method matched by the attribute rule.
#[derive(Debug, Clone)]
pub struct FunctionCandidate<'a> {
    pub file: &'a ParsedFile,
    pub decl: &'a TypeDecl,
    pub method: &'a MethodDecl,
    pub function_attribute: &'a AttributeDecl,
    /// The parameter carrying the activity trigger binding.
    pub trigger: &'a ParameterDecl,
}

/// Scans every declaration of every file, in order.
pub fn scan(files: &[ParsedFile]) -> Vec<Candidate<'_>> {
    files
        .iter()
        .flat_map(|file| file.types.iter().map(move |decl| (file, decl)))
        .flat_map(|(file, decl)| {
            let task = match_task_class(file, decl).map(Candidate::Task);
            let functions = decl
                .methods
                .iter()
                .filter_map(move |method| match_activity_function(file, decl, method))
                .map(Candidate::Function);
            task.into_iter().chain(functions)
        })
        .collect()
}

/// Structural rule: the first base type that is a recognized generic task base decides.
pub fn match_task_class<'a>(file: &'a ParsedFile, decl: &'a TypeDecl) -> Option<TaskCandidate<'a>> {
    if !decl.kind.can_inherit_class() {
        return None;
    }

    let (kind, type_args) = decl.base_types.iter().find_map(|base| recognized_base(base))?;

    if decl.has_modifier("abstract") {
        tracing::debug!(class = %decl.full_name(), %kind, "skipping abstract task class");
        return None;
    }
    if decl.arity > 0 {
        tracing::debug!(class = %decl.full_name(), %kind, "skipping open generic task class");
        return None;
    }

    Some(TaskCandidate {
        kind,
        file,
        decl,
        type_args,
    })
}

/// Matches `TaskOrchestrator<...>` / `TaskActivity<...>`, qualified or not.
fn recognized_base(text: &str) -> Option<(TaskKind, Vec<Option<TypeSyntax>>)> {
    let ty = TypeSyntax::parse(text).ok()?;
    let name = ty.as_named()?;
    let last = name.last();
    let type_args = last.type_args.as_ref()?;
    let kind = TaskKind::from_base_name(&last.name)?;

    let args = type_args
        .iter()
        .map(|arg| match arg {
            TypeArg::Type(ty) => Some(ty.clone()),
            TypeArg::Omitted => None,
        })
        .collect();
    Some((kind, args))
}

/// Attribute rule: `[Function(...)]` on the method and `[ActivityTrigger]` on a parameter.
pub fn match_activity_function<'a>(
    file: &'a ParsedFile,
    decl: &'a TypeDecl,
    method: &'a MethodDecl,
) -> Option<FunctionCandidate<'a>> {
    let function_attribute = method
        .attributes
        .iter()
        .find(|a| FUNCTION_ATTRIBUTE.matches(&a.name))?;
    let trigger = method
        .parameters
        .iter()
        .find(|p| p.attributes.iter().any(|a| ACTIVITY_TRIGGER_ATTRIBUTE.matches(&a.name)))?;

    Some(FunctionCandidate {
        file,
        decl,
        method,
        function_attribute,
        trigger,
    })
}

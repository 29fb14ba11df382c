//! The generation driver: candidates in, descriptors and an artifact out.

use crate::codegen::{self, GeneratedArtifact};
use crate::diagnostic::GeneratorWarning;
use crate::discovery::attribute::{DURABLE_TASK_ATTRIBUTE, FUNCTION_ATTRIBUTE};
use crate::discovery::classify::function_return_type;
use crate::discovery::{classify, resolve_task_name, Candidate, FunctionCandidate, ResolvedName, TaskCandidate, UNTYPED};
use crate::ir::{
    DiscoveredTasks, FunctionDescriptor, FunctionParameter, GenerationMode, NameSource, TaskDescriptor,
};
use crate::semantic::{ResolutionScope, SemanticModel};
use crate::validate::validate_names;

/// Result of one generation pass.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Tasks that received wrappers.
    pub tasks: DiscoveredTasks,
    pub mode: GenerationMode,
    /// `None` when nothing was discovered.
    pub artifact: Option<GeneratedArtifact>,
    pub warnings: Vec<GeneratorWarning>,
}

/// Turns scanned candidates into descriptors and renders the artifact.
///
/// `referenced_modules` decides the generation mode. The pass never fails:
/// anything that cannot be emitted is dropped and reported in `warnings`.
pub fn run<S: AsRef<str>>(
    candidates: &[Candidate<'_>],
    model: &SemanticModel,
    referenced_modules: &[S],
) -> GenerationOutcome {
    let mut warnings = Vec::new();
    let mut tasks = DiscoveredTasks::default();

    for candidate in candidates {
        match candidate {
            Candidate::Task(task) => tasks.push_task(describe_task(task, model, &mut warnings)),
            Candidate::Function(function) => {
                tasks.functions.push(describe_function(function, model, &mut warnings))
            }
        }
    }

    let (tasks, name_warnings) = validate_names(tasks);
    warnings.extend(name_warnings);

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let mode = GenerationMode::detect(referenced_modules);
    let artifact = codegen::generate(&tasks, mode);

    match &artifact {
        Some(artifact) => tracing::info!(
            orchestrators = tasks.orchestrators.len(),
            activities = tasks.activities.len(),
            functions = tasks.functions.len(),
            ?mode,
            hash = %artifact.content_hash,
            "generated durable task extensions"
        ),
        None => tracing::debug!("no durable tasks discovered; nothing to generate"),
    }

    GenerationOutcome {
        tasks,
        mode,
        artifact,
        warnings,
    }
}

fn note_fallback(resolved: &ResolvedName, declaration: &str, warnings: &mut Vec<GeneratorWarning>) {
    if let NameSource::NonConstantFallback { expression, span } = &resolved.source {
        warnings.push(GeneratorWarning::NonConstantTaskName {
            declaration: declaration.to_string(),
            expression: expression.clone(),
            fallback: resolved.name.clone(),
            span: span.clone(),
        });
    }
}

fn describe_task(
    candidate: &TaskCandidate<'_>,
    model: &SemanticModel,
    warnings: &mut Vec<GeneratorWarning>,
) -> TaskDescriptor {
    let decl = candidate.decl;
    let scope = ResolutionScope::for_type(candidate.file, decl);
    let declared_type_name = decl.full_name();

    let resolved = resolve_task_name(&decl.attributes, DURABLE_TASK_ATTRIBUTE, &decl.name, &scope, model);
    note_fallback(&resolved, &declared_type_name, warnings);

    let types = classify(&candidate.type_args, &scope, model);
    tracing::debug!(
        class = %declared_type_name,
        kind = %candidate.kind,
        task = %resolved.name,
        input = %types.input,
        output = %types.output,
        "discovered task class"
    );

    TaskDescriptor {
        kind: candidate.kind,
        declared_type_name,
        task_name: resolved.name,
        name_source: resolved.source,
        input_type: types.input,
        input_default_type: types.input_default,
        output_type: types.output,
        span: decl.span.clone(),
    }
}

fn describe_function(
    candidate: &FunctionCandidate<'_>,
    model: &SemanticModel,
    warnings: &mut Vec<GeneratorWarning>,
) -> FunctionDescriptor {
    let method = candidate.method;
    let scope = ResolutionScope::for_type(candidate.file, candidate.decl);
    let declared_in = format!("{}.{}", candidate.decl.full_name(), method.name);

    let resolved = resolve_task_name(&method.attributes, FUNCTION_ATTRIBUTE, &method.name, &scope, model);
    note_fallback(&resolved, &declared_in, warnings);

    let type_expr = match candidate.trigger.type_text.trim() {
        "" => UNTYPED.to_string(),
        text => text.to_string(),
    };
    tracing::debug!(method = %declared_in, task = %resolved.name, "discovered activity function");

    FunctionDescriptor {
        name: resolved.name,
        name_source: resolved.source,
        return_type: function_return_type(&method.return_type),
        parameter: FunctionParameter {
            name: candidate.trigger.name.clone(),
            type_expr,
        },
        declared_in,
        span: method.span.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Span;
    use crate::discovery::scan;
    use crate::frontend::csharp::ast::{ParsedFile, TypeDecl, TypeDeclKind};
    use crate::frontend::csharp::parser::CSharpParser;
    use crate::ir::HOST_INTEGRATION_MODULE;
    use std::path::Path;

    const NO_MODULES: &[&str] = &[];

    fn parse(source: &str) -> Vec<ParsedFile> {
        let mut parser = CSharpParser::new().unwrap();
        vec![parser.parse(source, Path::new("Tasks.cs")).unwrap()]
    }

    fn generate(files: &[ParsedFile], modules: &[&str]) -> GenerationOutcome {
        let model = SemanticModel::build(files, &[]);
        run(&scan(files), &model, modules)
    }

    const SQUARE: &str = r#"
using Microsoft.DurableTask;

namespace MyApp
{
    [DurableTask("Foo")]
    public class Square : TaskActivity<int, string>
    {
        public override Task<string> RunAsync(TaskActivityContext context, int input)
            => Task.FromResult((input * input).ToString());
    }
}
"#;

    #[test]
    fn test_untyped_orchestrator_standalone() {
        // `class Cleanup : TaskOrchestrator<>`, built directly: `<>` is not legal in a base list.
        let mut file = ParsedFile::new("Cleanup.cs");
        file.types.push(TypeDecl {
            name: "Cleanup".to_string(),
            kind: TypeDeclKind::Class,
            namespace: Some("MyApp".to_string()),
            containing_types: Vec::new(),
            arity: 0,
            modifiers: vec!["public".to_string()],
            attributes: Vec::new(),
            base_types: vec!["TaskOrchestrator<>".to_string()],
            methods: Vec::new(),
            constants: Vec::new(),
            span: Span::point("Cleanup.cs", 0),
        });

        let outcome = generate(&[file], NO_MODULES);
        let text = outcome.artifact.unwrap().text;

        assert_eq!(outcome.mode, GenerationMode::Standalone);
        assert!(text.contains("public static Task<string> ScheduleNewCleanupInstanceAsync("));
        assert!(text.contains("            object? input = default,\n"));
        assert!(text.contains("public static Task<object> CallCleanupAsync("));
        assert!(text.contains("builder.AddOrchestrator<MyApp.Cleanup>();"));
    }

    #[test]
    fn test_attribute_override_standalone() {
        let outcome = generate(&parse(SQUARE), NO_MODULES);
        let text = outcome.artifact.unwrap().text;

        assert_eq!(outcome.tasks.activities[0].task_name, "Foo");
        assert_eq!(outcome.tasks.activities[0].name_source, NameSource::Attribute);
        assert!(text.contains(
            "public static Task<string> CallFooAsync(this TaskOrchestrationContext ctx, int input, TaskOptions? options = null)"
        ));
        assert!(text.contains("ctx.CallActivityAsync<string>(\"Foo\", input, options);"));
        assert!(text.contains("builder.AddActivity<MyApp.Square>();"));
        assert!(!text.contains("[ActivityTrigger]"));
    }

    #[test]
    fn test_attribute_override_host_integrated() {
        let modules = ["microsoft.azure.functions.worker.extensions.durabletask", "Other.Package"];
        let outcome = generate(&parse(SQUARE), &modules);
        let text = outcome.artifact.unwrap().text;

        assert_eq!(outcome.mode, GenerationMode::HostIntegrated);
        assert!(text.contains("public static async Task<string> Foo([ActivityTrigger] int? input, string instanceId, FunctionContext executionContext)"));
        assert!(text.contains("sealed class GeneratedActivityContext : TaskActivityContext"));
        assert!(!text.contains("AddAllGeneratedTasks"));
        assert!(text.contains("ctx.CallActivityAsync<string>(\"Foo\", input, options);"));
    }

    #[test]
    fn test_no_candidates_no_artifact() {
        let outcome = generate(&parse("namespace App { public class Plain : BaseClass { } }"), &[HOST_INTEGRATION_MODULE]);
        assert!(outcome.artifact.is_none());
        assert!(outcome.tasks.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_non_constant_name_falls_back_with_warning() {
        let files = parse(
            r#"
namespace App
{
    [DurableTask(Names.Lookup())]
    public class Greet : TaskOrchestrator<string, string> { }
}
"#,
        );
        let outcome = generate(&files, NO_MODULES);

        assert_eq!(outcome.tasks.orchestrators[0].task_name, "Greet");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            GeneratorWarning::NonConstantTaskName { declaration, expression, fallback, .. }
                if declaration == "App.Greet" && expression == "Names.Lookup()" && fallback == "Greet"
        ));
        assert!(outcome.artifact.unwrap().text.contains("\"Greet\""));
    }

    #[test]
    fn test_function_activity_discovery() {
        let files = parse(
            r#"
namespace App
{
    public static class Functions
    {
        const string Name = "Notify";

        [Function(Name)]
        public static async Task<bool> SendNotification([ActivityTrigger] Message message, FunctionContext context)
        {
            return true;
        }
    }
}
"#,
        );
        let outcome = generate(&files, NO_MODULES);

        let function = &outcome.tasks.functions[0];
        assert_eq!(function.name, "Notify");
        assert_eq!(function.return_type, "bool");
        assert_eq!(function.parameter.to_string(), "Message message");
        assert_eq!(function.declared_in, "App.Functions.SendNotification");
        assert!(outcome.artifact.unwrap().text.contains(
            "public static Task<bool> CallNotifyAsync(this TaskOrchestrationContext ctx, Message message, TaskOptions? options = null)"
        ));
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let files = parse(SQUARE);
        let first = generate(&files, NO_MODULES).artifact.unwrap();
        let second = generate(&parse(SQUARE), NO_MODULES).artifact.unwrap();
        assert_eq!(first, second);
    }
}

//! C# templates for the members of a [`GeneratedUnit`].
//!
//! Type expressions and names are spliced in verbatim: they were rendered and
//! validated upstream.

use super::plan::{GeneratedUnit, Member};
use crate::ir::FunctionParameter;

/// Indentation of class members.
const MEMBER: &str = "        ";

/// Renders a unit to the full text of the generated file.
pub fn render(unit: &GeneratedUnit) -> String {
    let mut output = String::new();

    // Prologue
    output.push_str("// <auto-generated/>\n");
    output.push_str("#nullable enable annotations\n");
    output.push_str("#nullable disable warnings\n");
    output.push('\n');
    for using in &unit.usings {
        output.push_str(&format!("using {};\n", using));
    }
    output.push('\n');

    output.push_str(&format!("namespace {}\n{{\n", unit.namespace));
    output.push_str(&format!("    public static class {}\n    {{\n", unit.class_name));

    for (index, member) in unit.members.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        render_member(&mut output, member);
    }

    output.push_str("    }\n");
    output.push_str("}\n");
    output
}

/// Appends `text` with every non-empty line indented as a class member.
fn push_member(buffer: &mut String, text: &str) {
    for line in text.lines() {
        if !line.is_empty() {
            buffer.push_str(MEMBER);
            buffer.push_str(line);
        }
        buffer.push('\n');
    }
}

fn render_member(buffer: &mut String, member: &Member) {
    let text = match member {
        Member::OrchestratorSingleton { task_name, type_name } => {
            format!("static readonly ITaskOrchestrator singleton{task_name} = new {type_name}();\n")
        }
        Member::OrchestratorTrigger { task_name, input, output } => format!(
            r#"[Function(nameof({task_name}))]
public static Task<string> {task_name}([OrchestrationTrigger] string orchestratorState, FunctionContext executionContext)
{{
    return DurableOrchestrator.LoadAndRunAsync<{input}, {output}>(orchestratorState, singleton{task_name}, executionContext);
}}
"#
        ),
        Member::ScheduleWrapper { task_name, input_default } => format!(
            r#"/// <inheritdoc cref="DurableTaskClient.ScheduleNewOrchestrationInstanceAsync"/>
public static Task<string> ScheduleNew{task_name}InstanceAsync(
    this DurableTaskClient client,
    string? instanceId = null,
    {input_default} input = default,
    DateTimeOffset? startTime = null)
{{
    return client.ScheduleNewOrchestrationInstanceAsync(
        "{task_name}",
        instanceId,
        input,
        startTime);
}}
"#
        ),
        Member::SubOrchestrationWrapper { task_name, input_default, output } => format!(
            r#"/// <inheritdoc cref="TaskOrchestrationContext.CallSubOrchestratorAsync"/>
public static Task<{output}> Call{task_name}Async(
    this TaskOrchestrationContext context,
    string? instanceId = null,
    {input_default} input = default,
    TaskOptions? options = null)
{{
    return context.CallSubOrchestratorAsync<{output}>(
        "{task_name}",
        instanceId,
        input,
        options);
}}
"#
        ),
        Member::ActivityWrapper { task_name, input, output } => activity_wrapper(
            task_name,
            &FunctionParameter {
                name: "input".to_string(),
                type_expr: input.clone(),
            },
            output,
        ),
        Member::ActivityTrigger {
            task_name,
            type_name,
            input_default,
            output,
        } => format!(
            r#"[Function(nameof({task_name}))]
public static async Task<{output}> {task_name}([ActivityTrigger] {input_default} input, string instanceId, FunctionContext executionContext)
{{
    ITaskActivity activity = ActivatorUtilities.GetServiceOrCreateInstance<{type_name}>(executionContext.InstanceServices);
    TaskActivityContext context = new GeneratedActivityContext("{task_name}", instanceId, input);
    object? result = await activity.RunAsync(context, input);
    return ({output})result!;
}}
"#
        ),
        Member::FunctionActivityWrapper {
            name,
            parameter,
            return_type,
        } => activity_wrapper(name, parameter, return_type),
        Member::ContextAdapter => CONTEXT_ADAPTER.to_string(),
        Member::RegistrationHelper {
            orchestrators,
            activities,
        } => {
            let mut text = String::new();
            text.push_str("public static DurableTaskRegistry AddAllGeneratedTasks(this DurableTaskRegistry builder)\n");
            text.push_str("{\n");
            for type_name in orchestrators {
                text.push_str(&format!("    builder.AddOrchestrator<{}>();\n", type_name));
            }
            for type_name in activities {
                text.push_str(&format!("    builder.AddActivity<{}>();\n", type_name));
            }
            text.push_str("    return builder;\n");
            text.push_str("}\n");
            text
        }
    };

    push_member(buffer, &text);
}

fn activity_wrapper(name: &str, parameter: &FunctionParameter, output: &str) -> String {
    let argument = &parameter.name;
    format!(
        r#"/// <inheritdoc cref="TaskOrchestrationContext.CallActivityAsync"/>
public static Task<{output}> Call{name}Async(this TaskOrchestrationContext ctx, {parameter}, TaskOptions? options = null)
{{
    return ctx.CallActivityAsync<{output}>("{name}", {argument}, options);
}}
"#
    )
}

const CONTEXT_ADAPTER: &str = r#"sealed class GeneratedActivityContext : TaskActivityContext
{
    readonly object? input;

    public GeneratedActivityContext(TaskName name, string instanceId, object? input)
    {
        this.Name = name;
        this.InstanceId = instanceId;
        this.input = input;
    }

    public override TaskName Name { get; }

    public override string InstanceId { get; }

    public T GetInput<T>() => (T)this.input!;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::plan::build;
    use crate::diagnostic::Span;
    use crate::ir::{DiscoveredTasks, FunctionDescriptor, GenerationMode, NameSource, TaskDescriptor, TaskKind};

    fn task(kind: TaskKind, name: &str, input: &str, input_default: &str, output: &str) -> TaskDescriptor {
        TaskDescriptor {
            kind,
            declared_type_name: format!("MyApp.{}", name),
            task_name: name.to_string(),
            name_source: NameSource::Declared,
            input_type: input.to_string(),
            input_default_type: input_default.to_string(),
            output_type: output.to_string(),
            span: Span::point("Tasks.cs", 0),
        }
    }

    #[test]
    fn test_untyped_orchestrator_standalone_golden() {
        let mut tasks = DiscoveredTasks::default();
        tasks.push_task(task(TaskKind::Orchestrator, "Cleanup", "object", "object?", "object"));

        let text = render(&build(&tasks, GenerationMode::Standalone));

        let expected = r#"// <auto-generated/>
#nullable enable annotations
#nullable disable warnings

using System;
using System.Threading.Tasks;
using Microsoft.DurableTask.Client;

namespace Microsoft.DurableTask
{
    public static class GeneratedDurableTaskExtensions
    {
        /// <inheritdoc cref="DurableTaskClient.ScheduleNewOrchestrationInstanceAsync"/>
        public static Task<string> ScheduleNewCleanupInstanceAsync(
            this DurableTaskClient client,
            string? instanceId = null,
            object? input = default,
            DateTimeOffset? startTime = null)
        {
            return client.ScheduleNewOrchestrationInstanceAsync(
                "Cleanup",
                instanceId,
                input,
                startTime);
        }

        /// <inheritdoc cref="TaskOrchestrationContext.CallSubOrchestratorAsync"/>
        public static Task<object> CallCleanupAsync(
            this TaskOrchestrationContext context,
            string? instanceId = null,
            object? input = default,
            TaskOptions? options = null)
        {
            return context.CallSubOrchestratorAsync<object>(
                "Cleanup",
                instanceId,
                input,
                options);
        }

        public static DurableTaskRegistry AddAllGeneratedTasks(this DurableTaskRegistry builder)
        {
            builder.AddOrchestrator<MyApp.Cleanup>();
            return builder;
        }
    }
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_activity_host_integrated() {
        let mut tasks = DiscoveredTasks::default();
        tasks.push_task(task(TaskKind::Activity, "Square", "int", "int?", "int"));

        let text = render(&build(&tasks, GenerationMode::HostIntegrated));

        assert!(text.contains("using Microsoft.Azure.Functions.Worker;\n"));
        assert!(text.contains(
            "        public static Task<int> CallSquareAsync(this TaskOrchestrationContext ctx, int input, TaskOptions? options = null)\n"
        ));
        assert!(text.contains("            return ctx.CallActivityAsync<int>(\"Square\", input, options);\n"));
        assert!(text.contains(
            "        public static async Task<int> Square([ActivityTrigger] int? input, string instanceId, FunctionContext executionContext)\n"
        ));
        assert!(text.contains("GetServiceOrCreateInstance<MyApp.Square>(executionContext.InstanceServices);"));
        assert!(text.contains("            return (int)result!;\n"));
        assert!(text.contains("        sealed class GeneratedActivityContext : TaskActivityContext\n"));
        assert!(!text.contains("AddAllGeneratedTasks"));
    }

    #[test]
    fn test_orchestrator_host_integrated() {
        let mut tasks = DiscoveredTasks::default();
        tasks.push_task(task(TaskKind::Orchestrator, "Process", "Order", "Order?", "bool"));

        let text = render(&build(&tasks, GenerationMode::HostIntegrated));

        assert!(text.contains("        static readonly ITaskOrchestrator singletonProcess = new MyApp.Process();\n"));
        assert!(text.contains("        [Function(nameof(Process))]\n"));
        assert!(text.contains(
            "            return DurableOrchestrator.LoadAndRunAsync<Order, bool>(orchestratorState, singletonProcess, executionContext);\n"
        ));
        // Orchestrators alone do not need the activity context.
        assert!(!text.contains("GeneratedActivityContext"));
    }

    #[test]
    fn test_function_activity_wrapper() {
        let mut tasks = DiscoveredTasks::default();
        tasks.functions.push(FunctionDescriptor {
            name: "SayHello".to_string(),
            name_source: NameSource::Declared,
            return_type: "string".to_string(),
            parameter: FunctionParameter {
                name: "name".to_string(),
                type_expr: "string".to_string(),
            },
            declared_in: "MyApp.Functions.SayHello".to_string(),
            span: Span::point("Functions.cs", 0),
        });

        let text = render(&build(&tasks, GenerationMode::Standalone));

        assert!(text.contains(
            "        public static Task<string> CallSayHelloAsync(this TaskOrchestrationContext ctx, string name, TaskOptions? options = null)\n"
        ));
        assert!(text.contains("            return ctx.CallActivityAsync<string>(\"SayHello\", name, options);\n"));
        // Function activities are registered by the host, not the helper.
        assert!(text.contains(
            "        public static DurableTaskRegistry AddAllGeneratedTasks(this DurableTaskRegistry builder)\n        {\n            return builder;\n        }\n"
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut tasks = DiscoveredTasks::default();
        tasks.push_task(task(TaskKind::Orchestrator, "A", "int", "int?", "int"));
        tasks.push_task(task(TaskKind::Activity, "B", "string", "string?", "string"));
        let unit = build(&tasks, GenerationMode::HostIntegrated);
        assert_eq!(render(&unit), render(&unit.clone()));
    }
}

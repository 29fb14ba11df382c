//! Debug script to see what the parser and scanner produce.
//!
//! Usage: `debug_parse [file.cs]` (defaults to a built-in sample).

use std::path::Path;

use durabletask_generator::discovery::{scan, Candidate};
use durabletask_generator::frontend::csharp::parser::CSharpParser;

const SAMPLE: &str = r#"
using Microsoft.DurableTask;
using Microsoft.Azure.Functions.Worker;

namespace Orders;

[DurableTask(nameof(ProcessOrder))]
public class ProcessOrder : TaskOrchestrator<OrderRequest, OrderResult>
{
    public override Task<OrderResult> RunAsync(TaskOrchestrationContext context, OrderRequest input)
        => throw new NotImplementedException();
}

public static class Activities
{
    [Function("ChargeCard")]
    public static Task<bool> Charge([ActivityTrigger] decimal amount) => Task.FromResult(true);
}
"#;

fn main() {
    let (source, path) = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(source) => (source, path),
            Err(e) => {
                println!("Error reading {}: {}", path, e);
                return;
            }
        },
        None => (SAMPLE.to_string(), "Sample.cs".to_string()),
    };

    let mut parser = CSharpParser::new().unwrap();
    let parsed = match parser.parse(&source, Path::new(&path)) {
        Ok(parsed) => parsed,
        Err(e) => {
            println!("Error: {:?}", e);
            return;
        }
    };

    println!("Parsed file: {:?}", parsed.path);
    if let Some(span) = &parsed.syntax_error {
        println!("  syntax error at {}", span);
    }

    println!("\nUsings:");
    for using in &parsed.usings {
        println!("  {:?} {} (global: {})", using.kind, using.target, using.global);
    }

    println!("\nTypes:");
    for ty in &parsed.types {
        println!("  {} ({:?}, arity {})", ty.full_name(), ty.kind, ty.arity);
        println!("    bases: {:?}", ty.base_types);
        for attribute in &ty.attributes {
            println!("    [{}] {:?}", attribute.name, attribute.arguments);
        }
        for method in &ty.methods {
            println!("    method {} -> {:?}", method.name, method.return_type);
        }
        for constant in &ty.constants {
            println!("    const {} = {}", constant.name, constant.value);
        }
    }

    let files = [parsed];
    println!("\nCandidates:");
    for candidate in scan(&files) {
        match candidate {
            Candidate::Task(task) => println!("  {} {} {:?}", task.kind, task.decl.name, task.type_args),
            Candidate::Function(function) => {
                println!("  function {}.{}", function.decl.name, function.method.name)
            }
        }
    }
}

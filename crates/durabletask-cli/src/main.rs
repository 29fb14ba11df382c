//! Durable Task generator CLI.
//!
//! Scans a C# project for durable task declarations and writes the typed
//! wrapper file next to it.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{ArgAction, Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use tracing_subscriber::EnvFilter;

use durabletask_generator::codegen::GENERATED_FILE_NAME;
use durabletask_generator::config::CONFIG_FILE_NAME;
use durabletask_generator::diagnostic::Span;
use durabletask_generator::{
    display_path, Analysis, GenerateResult, GenerationMode, Generator, GeneratorConfig, GeneratorWarning, WriteStatus,
};

mod ui;

#[derive(Parser)]
#[command(name = "durabletask-gen")]
#[command(version)]
#[command(about = "Durable Task generator - typed wrappers for C# orchestrators and activities")]
struct Cli {
    /// Config file (default: ./durabletask.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override the config file.
#[derive(Args, Clone, Debug, Default)]
struct SourceArgs {
    /// C# source directory
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output directory for the generated file
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Project file to read references from
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Extra referenced module name (repeatable)
    #[arg(short, long = "reference")]
    references: Vec<String>,

    /// Source language
    #[arg(short, long)]
    language: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the wrapper file
    Generate {
        #[command(flatten)]
        args: SourceArgs,
    },

    /// Discover tasks and report them without writing anything
    Check {
        #[command(flatten)]
        args: SourceArgs,

        /// Print the discovery report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Regenerate whenever a source file changes
    Watch {
        #[command(flatten)]
        args: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate { args } => {
            let config = resolve_config(cli.config.as_deref(), &args)?;
            generate(config)?;
        }

        Commands::Check { args, json } => {
            let config = resolve_config(cli.config.as_deref(), &args)?;
            check(config, json)?;
        }

        Commands::Watch { args } => {
            let config = resolve_config(cli.config.as_deref(), &args)?;
            run_watch_mode(config).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout is reserved for the report.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "durabletask_generator=info",
        2 => "durabletask_generator=debug",
        _ => "durabletask_generator=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file (explicit or `./durabletask.toml`) with command-line overrides applied.
fn resolve_config(path: Option<&Path>, args: &SourceArgs) -> miette::Result<GeneratorConfig> {
    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(CONFIG_FILE_NAME)).filter(|p| p.is_file()),
    };
    let mut config = match &file {
        Some(file) => GeneratorConfig::load(file)?,
        None => GeneratorConfig::default(),
    };

    if let Some(source) = &args.source {
        config.source_dir = source.clone();
    }
    if let Some(out) = &args.out {
        config.out_dir = out.clone();
    } else if args.source.is_some() && file.is_none() {
        // Keep the default output inside the chosen project.
        config.out_dir = config.source_dir.join(&config.out_dir);
    }
    if let Some(project) = &args.project {
        config.project_file = Some(project.clone());
    }
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    config.references.extend(args.references.iter().cloned());

    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn generate(config: GeneratorConfig) -> miette::Result<()> {
    ui::print_compact_header(env!("CARGO_PKG_VERSION"));

    let start = Instant::now();
    let spinner = ui::spinner("Scanning sources...");
    let result = Generator::new(config).generate();
    spinner.finish_and_clear();

    let result = result?;
    print_generate_result(&result);
    ui::timing("Done", start.elapsed().as_millis());
    println!();
    Ok(())
}

fn print_generate_result(result: &GenerateResult) {
    let path = result.output_path.display();
    match result.status {
        WriteStatus::Written => ui::success(&format!("Wrote {}", path)),
        WriteStatus::Unchanged => ui::success(&format!("{} is up to date", path)),
        WriteStatus::Removed => ui::info(&format!("No tasks found; removed {}", path)),
        WriteStatus::Skipped => ui::info("No tasks found; nothing to generate"),
    }
    if result.status != WriteStatus::Skipped {
        ui::counts_line(result.orchestrators, result.activities, result.functions);
        ui::dim(&format!("    mode: {}", mode_label(result.mode)));
    }
    print_warnings(&result.warnings);
}

fn check(config: GeneratorConfig, json: bool) -> miette::Result<()> {
    if json {
        let analysis = Generator::new(config).check()?;
        let report = serde_json::to_string_pretty(&analysis).into_diagnostic()?;
        println!("{}", report);
        return Ok(());
    }

    let spinner = ui::spinner("Checking task declarations...");
    let analysis = Generator::new(config).check();
    spinner.finish_and_clear();

    let analysis = analysis?;
    print_analysis(&analysis);
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    let tasks = &analysis.tasks;

    ui::box_header(&format!("{} TASKS", ui::symbols::ARROW));
    ui::box_line("");
    for task in tasks.orchestrators.iter().chain(&tasks.activities) {
        ui::task_line(
            &task.kind.to_string().to_lowercase(),
            &task.task_name,
            &format!("{} -> {}", task.input_type, task.output_type),
        );
    }
    for function in &tasks.functions {
        ui::task_line(
            "function",
            &function.name,
            &format!("{} -> {}", function.parameter.type_expr, function.return_type),
        );
    }
    if tasks.is_empty() {
        ui::box_line("No durable tasks found.");
    }
    ui::box_line("");
    ui::box_footer();
    println!();

    ui::counts_line(tasks.orchestrators.len(), tasks.activities.len(), tasks.functions.len());
    ui::dim(&format!(
        "    {} source file(s) {} mode: {}",
        analysis.files,
        ui::symbols::DOT,
        mode_label(analysis.mode)
    ));
    if let Some(project) = &analysis.project.path {
        ui::dim(&format!("    project: {}", display_path(project).display()));
    }

    if analysis.warnings.is_empty() {
        println!();
        ui::looking_good();
    } else {
        print_warnings(&analysis.warnings);
    }
    println!();
}

fn print_warnings(warnings: &[GeneratorWarning]) {
    if warnings.is_empty() {
        return;
    }
    ui::warnings_header(warnings.len());
    for warning in warnings {
        ui::warning(&warning.to_string());
        if let Some(span) = warning_span(warning) {
            let file = display_path(&span.file);
            ui::dim(&format!("      at {}", ui::file_link(&file.to_string_lossy(), span.start_line + 1)));
        }
    }
}

fn warning_span(warning: &GeneratorWarning) -> Option<&Span> {
    match warning {
        GeneratorWarning::NonConstantTaskName { span, .. } => Some(span),
        GeneratorWarning::RecoveredSyntaxError { span } => Some(span),
        GeneratorWarning::DuplicateTaskName { .. } | GeneratorWarning::InvalidTaskName { .. } => None,
    }
}

fn mode_label(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::HostIntegrated => "azure functions",
        GenerationMode::Standalone => "standalone worker",
    }
}

/// Run a generation pass, then one more after every batch of relevant changes.
async fn run_watch_mode(config: GeneratorConfig) -> miette::Result<()> {
    ui::print_compact_header(env!("CARGO_PKG_VERSION"));
    let source_dir = config.source_dir.clone();

    regenerate(&config).await;

    // Channel for file change events
    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);

    let mut debouncer = new_debouncer(Duration::from_millis(300), move |result: DebounceEventResult| match result {
        Ok(events) => {
            if events.iter().any(|event| is_relevant_change(&event.path)) {
                let _ = tx.try_send(());
            }
        }
        Err(e) => tracing::warn!(error = %e, "file watcher error"),
    })
    .into_diagnostic()?;

    debouncer
        .watcher()
        .watch(&source_dir, RecursiveMode::Recursive)
        .into_diagnostic()?;

    println!();
    ui::info(&format!("Watching {} for changes...", display_path(&source_dir).display()));

    loop {
        tokio::select! {
            Some(()) = rx.recv() => {
                println!();
                regenerate(&config).await;
                println!();
                ui::info("Waiting for changes...");
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                ui::dim("Stopping watch mode.");
                break;
            }
        }
    }

    Ok(())
}

/// One generation pass on the blocking pool. Failures are printed, not returned.
async fn regenerate(config: &GeneratorConfig) {
    let spinner = ui::spinner("Generating...");
    let start = Instant::now();

    let config = config.clone();
    let result = tokio::task::spawn_blocking(move || Generator::new(config).generate()).await;
    spinner.finish_and_clear();

    match result {
        Ok(Ok(result)) => {
            print_generate_result(&result);
            ui::timing("Generated", start.elapsed().as_millis());
        }
        Ok(Err(e)) => ui::error(&e.to_string()),
        Err(e) => ui::error(&format!("generation task failed: {}", e)),
    }
}

/// Source and project edits trigger a pass; build output and our own artifact do not.
fn is_relevant_change(path: &Path) -> bool {
    if path.file_name().is_some_and(|name| name == GENERATED_FILE_NAME) {
        return false;
    }
    if path
        .components()
        .any(|c| matches!(c.as_os_str().to_str(), Some("bin" | "obj")))
    {
        return false;
    }
    path.extension().is_some_and(|ext| ext == "cs" || ext == "csproj")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_changes() {
        assert!(is_relevant_change(Path::new("/app/Orders/ProcessOrder.cs")));
        assert!(is_relevant_change(Path::new("/app/Orders.csproj")));
        assert!(!is_relevant_change(Path::new("/app/obj/generated/GeneratedDurableTaskExtensions.cs")));
        assert!(!is_relevant_change(Path::new("/app/out/GeneratedDurableTaskExtensions.cs")));
        assert!(!is_relevant_change(Path::new("/app/bin/Debug/App.cs")));
        assert!(!is_relevant_change(Path::new("/app/README.md")));
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file, "source_dir = \"src\"\nreferences = [\"From.File\"]\n").unwrap();

        let args = SourceArgs {
            out: Some(PathBuf::from("gen")),
            references: vec!["From.Flag".to_string()],
            ..SourceArgs::default()
        };
        let config = resolve_config(Some(&file), &args).unwrap();

        assert_eq!(config.source_dir, dir.path().join("src"));
        assert_eq!(config.out_dir, PathBuf::from("gen"));
        assert_eq!(config.references, vec!["From.File", "From.Flag"]);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let missing = PathBuf::from("/nonexistent/durabletask.toml");
        assert!(resolve_config(Some(&missing), &SourceArgs::default()).is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["durabletask-gen", "-vv", "check", "--json", "-s", "src", "-r", "A", "-r", "B"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Check { args, json } => {
                assert!(json);
                assert_eq!(args.source, Some(PathBuf::from("src")));
                assert_eq!(args.references, vec!["A", "B"]);
            }
            _ => panic!("expected check"),
        }
    }
}

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use protoargs_core::{CommandDescriptor, load_descriptor};
use protoargs_engine::{self as engine, Config, Invocation, ParseOptions, dispatch, exclude};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "protoargs")]
#[command(about = "Check argument schemas, render usage and parse argv against them")]
#[command(version)]
struct Cli {
    /// Log parser decisions to stderr (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate one or more schema files (.json, .yaml, .yml).
    Check(CheckArgs),
    /// Print usage text for a command or one of its subcommands.
    Usage(UsageArgs),
    /// Parse argv against a schema and print the typed configuration.
    Parse(ParseArgs),
    /// Drop 1-based argument positions from argv.
    Exclude(ExcludeArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema files to validate.
    #[arg(required = true)]
    schemas: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Schema file.
    schema: PathBuf,
    /// Subcommand path, one name per flag (e.g. --command remote --command add).
    #[arg(long = "command", value_name = "NAME")]
    commands: Vec<String>,
    /// Program name shown in the synopsis (default: schema name plus subcommand path).
    #[arg(long)]
    program: Option<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema file.
    schema: PathBuf,
    /// Accept missing required arguments, unknown flags and unknown commands.
    #[arg(long)]
    allow_incomplete: bool,
    /// Examine only the first N argv entries (program name included).
    #[arg(long)]
    argc: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Argument vector to parse, program name first.
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct ExcludeArgs {
    /// Comma-separated 1-based positions to drop (position 1 is the program name).
    #[arg(long, value_delimiter = ',', required = true)]
    positions: Vec<usize>,
    /// Examine only the first N argv entries.
    #[arg(long)]
    argc: Option<usize>,
    /// Argument vector, program name first.
    #[arg(last = true)]
    argv: Vec<String>,
}

/// Serialized view of one parsed command level.
#[derive(Debug, Serialize)]
struct Report<'a> {
    program: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'a str>,
    config: &'a Config,
    #[serde(skip_serializing_if = "is_empty")]
    ignored: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    unrecognized: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    subcommand: Option<Box<Report<'a>>>,
}

impl<'a> From<&'a Invocation> for Report<'a> {
    fn from(invocation: &'a Invocation) -> Self {
        let config = &invocation.config;
        Self {
            program: config.program(),
            command: config.command(),
            config,
            ignored: config.ignored(),
            unrecognized: config.unrecognized(),
            subcommand: invocation
                .subcommand
                .as_deref()
                .map(|sub| Box::new(Report::from(sub))),
        }
    }
}

fn is_empty(list: &&[String]) -> bool {
    list.is_empty()
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Usage(args) => run_usage(args),
        Command::Parse(args) => run_parse(args),
        Command::Exclude(args) => run_exclude(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let mut commands = 0;
    let mut failures = 0;

    for path in &args.schemas {
        match load_descriptor(path) {
            Ok(descriptor) => {
                let count = count_commands(&descriptor);
                println!("ok: {} ({count} command(s))", path.display());
                commands += count;
            }
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} schema file(s) failed validation",
            args.schemas.len()
        ));
    }
    println!(
        "Validated {} schema file(s) for {commands} command(s).",
        args.schemas.len()
    );
    Ok(())
}

fn run_usage(args: UsageArgs) -> Result<(), String> {
    let parser = compile(&args.schema)?;
    let level = args.commands.iter().try_fold(&parser, |level, name| {
        level.subcommand(name).ok_or_else(|| {
            format!(
                "Unknown command '{name}' (available: {})",
                level.descriptor().subcommand_names().join(", ")
            )
        })
    })?;

    let program = args.program.unwrap_or_else(|| {
        std::iter::once(parser.name())
            .chain(args.commands.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    });
    print!("{}", level.usage(&program));
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let parser = compile(&args.schema)?;
    let argv = if args.argv.is_empty() {
        vec![parser.name().to_string()]
    } else {
        args.argv
    };

    let mut options = ParseOptions::new().allow_incomplete(args.allow_incomplete);
    if let Some(argc) = args.argc {
        options = options.with_argc(argc);
    }

    let invocation = match dispatch(&parser, &argv, &options) {
        Ok(invocation) => invocation,
        Err(err) => {
            let (level, program) = failing_level(&parser, &argv, &options);
            eprint!("{}", level.usage(&program));
            return Err(err.to_string());
        }
    };

    let leaf = invocation.leaf();
    if leaf.config.help() {
        let level = resolve(&parser, &invocation.path());
        print!("{}", level.usage(leaf.config.program()));
        return Ok(());
    }

    let report = Report::from(&invocation);
    let raw = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|err| format!("Failed to serialize configuration: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&report)
            .map_err(|err| format!("Failed to serialize configuration: {err}"))?,
    };
    println!("{}", raw.trim_end());
    Ok(())
}

fn run_exclude(args: ExcludeArgs) -> Result<(), String> {
    let argc = args.argc.unwrap_or(args.argv.len());
    let filtered = exclude(argc, &args.argv, &args.positions);
    let raw = serde_json::to_string(&filtered)
        .map_err(|err| format!("Failed to serialize argv: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn compile(path: &Path) -> Result<engine::Parser, String> {
    let descriptor =
        load_descriptor(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    debug!(schema = %path.display(), command = %descriptor.name, "Loaded schema");
    engine::Parser::new(&descriptor)
        .map_err(|err| format!("Invalid schema '{}': {err}", path.display()))
}

fn count_commands(descriptor: &CommandDescriptor) -> usize {
    1 + descriptor.subcommands.iter().map(count_commands).sum::<usize>()
}

fn resolve<'a>(parser: &'a engine::Parser, path: &[&str]) -> &'a engine::Parser {
    path.iter()
        .fold(parser, |level, name| level.subcommand(name).unwrap_or(level))
}

/// Deepest command level reachable from argv, for printing usage next to an error.
fn failing_level<'a>(
    parser: &'a engine::Parser,
    argv: &[String],
    options: &ParseOptions,
) -> (&'a engine::Parser, String) {
    let lenient = options.clone().allow_incomplete(true);
    match dispatch(parser, argv, &lenient) {
        Ok(invocation) => (
            resolve(parser, &invocation.path()),
            invocation.leaf().config.program().to_string(),
        ),
        Err(_) => (
            parser,
            argv.first().cloned().unwrap_or_else(|| parser.name().to_string()),
        ),
    }
}

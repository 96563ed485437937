//! Kiln CLI: the command-line interface for the incremental build orchestrator.
//!
//! Provides `kiln build` for incremental compilation of one or all build
//! roots, `kiln graph` for inspecting the learned dependent graph, and
//! `kiln clean` for discarding persisted state and compiled artifacts.

#![warn(missing_docs)]

mod build;
mod clean;
mod graph;
mod project;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Kiln: incremental builds driven by a learned dependency graph.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln incremental build orchestrator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `kiln.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile what changed, plus everything that depends on it.
    Build(BuildArgs),
    /// Print the dependent graph learned by the last successful build.
    Graph(GraphArgs),
    /// Discard persisted build state and compiled artifacts.
    Clean(CleanArgs),
}

/// Arguments for the `kiln build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Build only this root (default: every configured root, in parallel).
    #[arg(short, long)]
    pub root: Option<String>,

    /// Request every source unit instead of only the changed ones.
    #[arg(long, conflicts_with = "units")]
    pub full: bool,

    /// Source units to request explicitly, instead of detecting changes.
    pub units: Vec<String>,
}

/// Arguments for the `kiln graph` subcommand.
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Show only this root.
    #[arg(short, long)]
    pub root: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `kiln clean` subcommand.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Clean only this root.
    #[arg(short, long)]
    pub root: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Output format for inspection commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Graph(ref args) => graph::run(args, &global),
        Command::Clean(ref args) => clean::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Default log filter when `RUST_LOG` is unset.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_tracing(global: &GlobalArgs) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(global.color)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

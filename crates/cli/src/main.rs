//! kiln-cli: command-line front end for the kiln build engine.
//!
//! Provides the `kiln` command with subcommands:
//! - `kiln run <target>` - execute a target after its dependencies
//! - `kiln list` - print the registered targets
//! - `kiln graph <target>` - print the dependency tree below a target
//!
//! Targets come from a TOML build manifest, `kiln.toml` by default.

mod cmd;
mod manifest;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use kiln_lib::host::BuildLog;

use output::{ConsoleLog, OutputFormat};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about = "Build target runner with a declarative dependency graph")]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Execute a target and its transitive dependencies
  Run {
    /// Target to build
    target: String,

    /// Path to the build manifest
    #[arg(short, long, default_value = "kiln.toml")]
    file: PathBuf,

    /// Worker pool size; values above 1 select level-parallel execution
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Run only the named target, skipping its dependencies
    #[arg(long)]
    single_target: bool,
  },

  /// List registered targets with descriptions and dependencies
  List {
    /// Path to the build manifest
    #[arg(short, long, default_value = "kiln.toml")]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Print the dependency tree below a target
  Graph {
    /// Target to inspect
    target: String,

    /// Path to the build manifest
    #[arg(short, long, default_value = "kiln.toml")]
    file: PathBuf,

    /// Print every traversal visit instead of the shortened tree
    #[arg(long)]
    full: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
  FmtSubscriber::builder()
    .with_max_level(level)
    .with_target(false)
    .without_time()
    .init();

  match dispatch(cli) {
    Ok(code) => code,
    Err(err) => {
      ConsoleLog.trace_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
  match cli.command {
    Commands::Run {
      target,
      file,
      jobs,
      single_target,
    } => cmd::cmd_run(&file, &target, jobs, single_target),
    Commands::List { file, format } => cmd::cmd_list(&file, format).map(|()| ExitCode::SUCCESS),
    Commands::Graph { target, file, full } => {
      cmd::cmd_graph(&file, &target, full).map(|()| ExitCode::SUCCESS)
    }
  }
}

//! CLI argument parsing for pipewright.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pipewright: run parameterized build and deployment pipelines.
///
/// A pipeline is a YAML file (or a built-in name) declaring parameters and
/// an ordered list of steps: clone a repository, render config templates,
/// run commands and containers, collect artifacts. The first failing step
/// stops the run.
#[derive(Parser, Debug)]
#[command(name = "pipewright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for pipewright.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in pipelines.
    List,

    /// Show the parameters a pipeline accepts.
    Params(ParamsArgs),

    /// Load a pipeline and validate it without running anything.
    ///
    /// Catches unknown placeholders, duplicate names and missing fields.
    Check(CheckArgs),

    /// Render a single template file.
    Render(RenderArgs),

    /// Run a pipeline.
    ///
    /// Parameters come from `--param name=value` or from environment
    /// variables with the same name. If a required parameter is missing the
    /// accepted parameters are printed and nothing runs.
    Run(RunArgs),
}

/// Output format for `params`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Arguments for the `params` command.
#[derive(Parser, Debug)]
pub struct ParamsArgs {
    /// Built-in pipeline name or path to a pipeline file.
    pub pipeline: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Built-in pipeline name or path to a pipeline file.
    pub pipeline: String,
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Template file to render.
    pub template: PathBuf,

    /// Binding as name=value (repeatable).
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Built-in pipeline name or path to a pipeline file.
    pub pipeline: String,

    /// Parameter as name=value (repeatable). Wins over the environment.
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Directory holding `.pipewright/` state (default: current directory).
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Settings file (default: `<workdir>/.pipewright/config.yaml`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keep the workspace under `.pipewright/workspaces/<run_id>`.
    #[arg(long)]
    pub keep_workspace: bool,

    /// Where successful runs publish collected artifacts.
    #[arg(long)]
    pub artifacts_dir: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

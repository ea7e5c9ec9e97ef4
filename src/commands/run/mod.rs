//! Implementation of the `pipewright run` command.
//!
//! # What `pipewright run` does
//!
//! 1. Resolves the working directory and loads `.pipewright/config.yaml`
//! 2. Loads and validates the pipeline (file path or built-in name)
//! 3. Pre-flight: resolves parameters; if any required one is missing,
//!    prints the accepted parameters and stops before any step runs
//! 4. Acquires the run scope (workspace + artifact staging area)
//! 5. Runs the steps in order, stopping at the first failure
//! 6. Publishes collected artifacts (success only) and releases the scope


use crate::cli::RunArgs;
use crate::config::Config;
use crate::context::RunContext;
use crate::error::{PipewrightError, Result};
use crate::events::{Event, EventAction, EventLog};
use crate::params::{ParamSource, Preflight, preflight};
use crate::pipeline::Pipeline;
use crate::runner::{RunOptions, StepResult};
use crate::steps::ProcessExecutor;
use crate::workflow::{RunReport, RunScope, ScopeOptions, Workflow, new_run_id};
use serde_json::json;

/// Execute the `pipewright run` command.
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let overrides = ParamSource::parse_overrides(&args.params)?;
    let report = run_pipeline(&args, &ParamSource::from_env(overrides))?;
    report.into_result().map(|_| ())
}

/// Everything up to and including the run; parameters come from `source`.
pub(crate) fn run_pipeline(args: &RunArgs, source: &ParamSource) -> Result<RunReport> {
    let ctx = match &args.workdir {
        Some(dir) => RunContext::resolve_from(dir)?,
        None => RunContext::resolve()?,
    };
    let config = load_config(&ctx, args)?;
    let pipeline = Pipeline::find(&args.pipeline)?;

    let log = if config.log_events {
        EventLog::new(ctx.events_dir())
    } else {
        EventLog::disabled()
    };
    let run_id = new_run_id(&pipeline.name);

    let outcome = preflight(&pipeline.name, &pipeline.parameters, source)?;
    let missing: &[String] = match &outcome {
        Preflight::Ready(_) => &[],
        Preflight::NotReady(declaration) => &declaration.missing,
    };
    let event = Event::new(EventAction::Preflight, &run_id).with_details(json!({
        "pipeline": pipeline.name,
        "ready": missing.is_empty(),
        "missing": missing,
    }));
    if let Err(e) = log.append(&event) {
        eprintln!("Warning: failed to record preflight event: {}", e);
    }

    let params = match outcome {
        Preflight::Ready(params) => params,
        Preflight::NotReady(declaration) => {
            println!("{}", declaration.to_table());
            return Err(PipewrightError::MissingParameter(declaration.missing));
        }
    };

    let mut scope = RunScope::acquire(
        &run_id,
        ScopeOptions {
            workspace_root: config
                .workspace_root
                .as_deref()
                .map(|root| ctx.resolve_path(root)),
            keep_in: config.keep_workspace.then(|| ctx.workspaces_dir()),
            run: RunOptions::default()
                .with_limits(config.output_max_lines, config.output_max_chars),
        },
    )?;

    println!(
        "Running pipeline '{}' ({} step(s), run {})",
        pipeline.name,
        pipeline.steps.len(),
        run_id
    );

    let mut executor = ProcessExecutor::new().with_base_dir(pipeline.base_dir.clone());
    let mut workflow = Workflow::from_pipeline(&pipeline, params)
        .with_log(log)
        .with_publish_to(ctx.artifacts_root(&config))
        .with_echo(true);
    let report = workflow.run(&mut executor, &mut scope)?;

    print_summary(&report);
    if scope.is_kept() {
        println!("Workspace kept at {}", scope.workspace().display());
    }

    Ok(report)
}

/// Settings file (or `--config`), with CLI flags applied on top.
fn load_config(ctx: &RunContext, args: &RunArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(ctx.resolve_path(&path.to_string_lossy()))?,
        None => Config::load_or_default(ctx.config_path())?,
    };

    if args.keep_workspace {
        config.keep_workspace = true;
    }
    if let Some(dir) = &args.artifacts_dir {
        config.artifacts_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn print_summary(report: &RunReport) {
    println!();
    for record in &report.records {
        let status = match &record.result {
            StepResult::Success { .. } => "ok".to_string(),
            StepResult::Failure { exit_code, .. } => format!("FAILED (exit {})", exit_code),
        };
        println!(
            "  {}. {:<24} {:<18} {:.1}s",
            record.number,
            record.name,
            status,
            record.duration.as_secs_f64()
        );
    }

    if report.is_success() {
        println!("Pipeline '{}' succeeded.", report.pipeline);
        if let Some(dir) = &report.artifacts {
            println!("Artifacts: {}", dir.display());
        }
    } else {
        println!("Pipeline '{}' {}.", report.pipeline, report.state);
    }
}

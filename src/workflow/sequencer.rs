//! Runs a pipeline's steps in order, stopping at the first failure.

use super::scope::{CleanupRecord, RunScope};
use super::state::WorkflowState;
use crate::error::{PipewrightError, Result};
use crate::events::{Event, EventAction, EventLog};
use crate::params::Params;
use crate::pipeline::{Pipeline, Step};
use crate::runner::{StepResult, mask_secrets};
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What a step can see while it executes.
pub struct StepContext<'a> {
    pub params: &'a Params,
    pub scope: &'a mut RunScope,
    /// 1-based position of the step.
    pub number: usize,
    pub total: usize,
}

/// Executes one step.
///
/// A tool failure is reported as `Ok(StepResult::Failure { .. })`; an `Err`
/// means the step could not be attempted (template error, I/O). Both fail
/// the run.
pub trait StepExecutor {
    fn execute(&mut self, step: &Step, ctx: &mut StepContext<'_>) -> Result<StepResult>;
}

/// One executed step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub number: usize,
    pub name: String,
    pub result: StepResult,
    pub duration: Duration,
}

/// Outcome of [`Workflow::run`].
#[derive(Debug)]
pub struct RunReport {
    pub run_id: String,
    pub pipeline: String,
    pub state: WorkflowState,
    /// Executed steps, in order. Steps after a failure are absent.
    pub records: Vec<StepRecord>,
    /// Error that ended the run, if any.
    pub failure: Option<PipewrightError>,
    /// Where collected artifacts were published.
    pub artifacts: Option<PathBuf>,
    pub cleanup: Vec<CleanupRecord>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.state == WorkflowState::Succeeded && self.failure.is_none()
    }

    /// `Err` with the error that ended the run, otherwise the report.
    pub fn into_result(mut self) -> Result<Self> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Identifier for a new run of `pipeline`: name plus UTC timestamp.
pub fn new_run_id(pipeline: &str) -> String {
    format!("{}-{}", pipeline, Utc::now().format("%Y%m%d-%H%M%S-%3f"))
}

/// An ordered list of steps bound to one frozen parameter set.
#[derive(Debug)]
pub struct Workflow {
    name: String,
    steps: Vec<Step>,
    params: Params,
    state: WorkflowState,
    log: EventLog,
    publish_to: Option<PathBuf>,
    echo: bool,
}

impl Workflow {
    pub fn new(name: impl Into<String>, steps: Vec<Step>, params: Params) -> Self {
        Self {
            name: name.into(),
            steps,
            params,
            state: WorkflowState::Pending,
            log: EventLog::disabled(),
            publish_to: None,
            echo: false,
        }
    }

    pub fn from_pipeline(pipeline: &Pipeline, params: Params) -> Self {
        Self::new(pipeline.name.clone(), pipeline.steps.clone(), params)
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    /// Publish collected artifacts under `dir/<run_id>` when the run succeeds.
    pub fn with_publish_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.publish_to = Some(dir.into());
        self
    }

    /// Print progress lines to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Run every step in order until one fails, then release `scope`.
    ///
    /// Errors only when the workflow already ran or the run log cannot be
    /// started; step failures are reported in the returned [`RunReport`].
    pub fn run(
        &mut self,
        executor: &mut dyn StepExecutor,
        scope: &mut RunScope,
    ) -> Result<RunReport> {
        let total = self.steps.len();
        if self.state != WorkflowState::Pending {
            return Err(PipewrightError::UserError(format!(
                "workflow '{}' has already run (state: {})",
                self.name, self.state
            )));
        }

        let run_id = scope.run_id().to_string();
        let secrets = self.params.secrets().to_vec();
        let masked_params: Map<String, Value> = self
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(mask_secrets(v, &secrets))))
            .collect();

        self.log.append(
            &Event::new(EventAction::RunStart, &run_id).with_details(json!({
                "pipeline": self.name,
                "steps": total,
                "params": masked_params,
                "workspace": scope.workspace().display().to_string(),
            })),
        )?;
        self.state.start(total);

        let mut records = Vec::new();
        let mut failure = None;

        while let WorkflowState::Running(index) = self.state {
            let step = &self.steps[index];
            let number = index + 1;

            if self.echo {
                println!(
                    "==> [{}/{}] {}: {}",
                    number,
                    total,
                    step.name,
                    step.kind.summary()
                );
            }
            log_or_warn(
                &self.log,
                Event::new(EventAction::StepStart, &run_id)
                    .with_step(&step.name)
                    .with_details(json!({
                        "number": number,
                        "total": total,
                        "kind": step.kind.label(),
                    })),
            );

            let started = Instant::now();
            let mut ctx = StepContext {
                params: &self.params,
                scope: &mut *scope,
                number,
                total,
            };
            let (result, error) = match executor.execute(step, &mut ctx) {
                Ok(result) => (result, None),
                Err(err) => (
                    StepResult::failure(-1, mask_secrets(&err.to_string(), &secrets)),
                    Some(err),
                ),
            };
            let duration = started.elapsed();

            let mut details = json!({
                "number": number,
                "success": result.is_success(),
                "exit_code": result.exit_code(),
                "duration_ms": duration.as_millis() as u64,
            });
            if let StepResult::Failure { message, .. } = &result {
                details["message"] = Value::String(mask_secrets(message, &secrets));
            }
            log_or_warn(
                &self.log,
                Event::new(EventAction::StepComplete, &run_id)
                    .with_step(&step.name)
                    .with_details(details),
            );

            match &result {
                StepResult::Success { .. } => self.state.advance(total),
                StepResult::Failure { exit_code, message } => {
                    let reason = match &error {
                        Some(err) => mask_secrets(&err.to_string(), &secrets),
                        None => format!("step '{}' exited with code {}", step.name, exit_code),
                    };
                    failure = Some(error.unwrap_or_else(|| PipewrightError::ExternalTool {
                        step: step.name.clone(),
                        exit_code: *exit_code,
                        message: message.clone(),
                    }));
                    self.state.fail(reason);
                }
            }

            records.push(StepRecord {
                number,
                name: step.name.clone(),
                result,
                duration,
            });
        }

        let mut artifacts = None;
        if self.state == WorkflowState::Succeeded
            && let Some(dest) = &self.publish_to
        {
            match scope.publish(dest) {
                Ok(published) => artifacts = published,
                Err(err) => failure = Some(err),
            }
        }

        let cleanup = scope.release();
        for record in &cleanup {
            if let StepResult::Failure { message, .. } = &record.result {
                eprintln!("Warning: cleanup '{}' failed: {}", record.label, message);
            }
            log_or_warn(
                &self.log,
                Event::new(EventAction::Cleanup, &run_id).with_details(json!({
                    "label": record.label,
                    "success": record.result.is_success(),
                    "exit_code": record.result.exit_code(),
                })),
            );
        }

        let report = RunReport {
            run_id: run_id.clone(),
            pipeline: self.name.clone(),
            state: self.state.clone(),
            records,
            failure,
            artifacts,
            cleanup,
        };

        log_or_warn(
            &self.log,
            Event::new(EventAction::RunComplete, &run_id).with_details(json!({
                "state": report.state.to_string(),
                "success": report.is_success(),
                "steps_run": report.records.len(),
                "artifacts": report.artifacts.as_ref().map(|p| p.display().to_string()),
            })),
        );

        Ok(report)
    }
}

/// Once a run has started, a log write failure must not abort it.
fn log_or_warn(log: &EventLog, event: Event) {
    if let Err(e) = log.append(&event) {
        eprintln!("Warning: failed to record {} event: {}", event.action, e);
    }
}

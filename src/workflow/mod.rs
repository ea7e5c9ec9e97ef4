//! Step sequencing.
//!
//! A [`Workflow`] starts `Pending`, moves through `Running(i)` for each step
//! and ends in `Succeeded` or `Failed`. The first failing step ends the run;
//! later steps never execute. Whatever the outcome, the [`RunScope`] holding
//! the workspace and started containers is released before `run` returns.

mod scope;
mod sequencer;
mod state;


pub use scope::{CleanupRecord, RunScope, ScopeOptions};
pub use sequencer::{RunReport, StepContext, StepExecutor, StepRecord, Workflow, new_run_id};
pub use state::WorkflowState;

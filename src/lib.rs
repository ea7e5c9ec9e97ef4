//! Pipewright: parameterized template-render-and-execute pipelines.
//!
//! A run goes through three pieces:
//!
//! - [`template`] fills `$name` placeholders from a binding map, failing on
//!   any unbound name
//! - [`runner`] runs one external command and maps its exit status to a
//!   [`runner::StepResult`]
//! - [`workflow`] runs an ordered list of steps, stopping at the first
//!   failure and releasing the run's resources either way
//!
//! Parameters are resolved up front by [`params::preflight`]; pipelines are
//! YAML documents described in [`pipeline`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod params;
pub mod pipeline;
pub mod runner;
pub mod steps;
pub mod template;
pub mod workflow;

#[cfg(test)]
mod test_support;

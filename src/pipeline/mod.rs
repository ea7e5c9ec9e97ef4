//! Pipeline definitions.
//!
//! A pipeline is a YAML document naming the parameters it accepts and the
//! ordered steps it runs:
//!
//! ```yaml
//! name: zabbix-agent
//! parameters:
//!   - { name: target_hosts, type: string, description: "Hosts to configure" }
//! steps:
//!   - name: inventory
//!     render: { template: "[agents]\n$target_hosts\n", dest: inventory.ini }
//!   - name: apply
//!     exec: { command: "ansible-playbook -i inventory.ini playbook.yml" }
//! ```
//!
//! Every string field of a step is a template over the run bindings: the
//! parameters plus the built-in variables in [`BUILTIN_VARIABLES`].

mod builtin;
mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use builtin::{builtin, builtin_names};
pub use model::{
    CollectSpec, ContainerSpec, ExecSpec, FetchSpec, Pipeline, RenderSpec, Step, StepKind,
};

/// Scratch directory of the run.
pub const VAR_WORKSPACE: &str = "workspace";
/// Staging directory published as the run's artifacts on success.
pub const VAR_ARTIFACTS_DIR: &str = "artifacts_dir";
/// Identifier of the run.
pub const VAR_RUN_ID: &str = "run_id";

/// Variables bound in every run in addition to the parameters.
pub const BUILTIN_VARIABLES: [&str; 3] = [VAR_WORKSPACE, VAR_ARTIFACTS_DIR, VAR_RUN_ID];

//! Pipeline and step definitions.

use crate::params::ParamSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A named, parameterized list of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub parameters: Vec<ParamSpec>,

    #[serde(default)]
    pub steps: Vec<Step>,

    /// Directory `template_file` paths are resolved against (the definition
    /// file's directory; `None` for built-ins).
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// One step: a name plus exactly one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStep", into = "RawStep")]
pub struct Step {
    pub name: String,
    pub kind: StepKind,
}

impl Step {
    pub fn new(name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Fetch(FetchSpec),
    Render(RenderSpec),
    Exec(ExecSpec),
    Container(ContainerSpec),
    Collect(CollectSpec),
}

impl StepKind {
    /// Key used for this kind in YAML.
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Fetch(_) => "fetch",
            StepKind::Render(_) => "render",
            StepKind::Exec(_) => "exec",
            StepKind::Container(_) => "container",
            StepKind::Collect(_) => "collect",
        }
    }

    /// One-line description built from the unrendered fields.
    pub fn summary(&self) -> String {
        match self {
            StepKind::Fetch(spec) => format!("clone {} into {}", spec.url, spec.dest),
            StepKind::Render(spec) => match (&spec.template_file, &spec.template) {
                (Some(file), _) => format!("render {} to {}", file, spec.dest),
                _ => format!("render inline template to {}", spec.dest),
            },
            StepKind::Exec(spec) => spec.command.clone(),
            StepKind::Container(spec) => format!("run {} as {}", spec.image, spec.name),
            StepKind::Collect(spec) => format!("collect {}", spec.patterns.join(", ")),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Clone a repository into the workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSpec {
    pub url: String,

    /// Branch or tag; omitted from the clone when empty.
    pub branch: String,

    /// Target directory relative to the workspace.
    #[serde(default = "default_fetch_dest")]
    pub dest: String,

    /// Private key used through `GIT_SSH_COMMAND`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
}

fn default_fetch_dest() -> String {
    "src".to_string()
}

/// Render a template into a file in the workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSpec {
    /// Inline template text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Template file, relative to the pipeline file (or the workspace for built-ins).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_file: Option<String>,

    /// Output path relative to the workspace.
    pub dest: String,

    /// Step-local bindings; values are templates over the run bindings.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, String>,
}

/// Run a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecSpec {
    pub command: String,

    /// Working directory relative to the workspace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Command run when the run ends, registered once `command` succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<String>,
}

/// Start a detached container that is removed when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSpec {
    pub image: String,

    /// Container name; used for removal.
    pub name: String,

    /// `host:container` port mappings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Arguments passed after the image.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Command run once the container is up; its result is the step's result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<String>,
}

/// Copy matching files from the workspace into the run's artifact staging area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectSpec {
    /// Glob patterns relative to `from`.
    pub patterns: Vec<String>,

    /// Directory relative to the workspace (default: the workspace itself).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Succeed even when nothing matches.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub allow_empty: bool,
}

/// YAML shape of a step; exactly one kind key must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetch: Option<FetchSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    render: Option<RenderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exec: Option<ExecSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<ContainerSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collect: Option<CollectSpec>,
}

impl TryFrom<RawStep> for Step {
    type Error = String;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let mut kinds: Vec<StepKind> = Vec::new();
        kinds.extend(raw.fetch.map(StepKind::Fetch));
        kinds.extend(raw.render.map(StepKind::Render));
        kinds.extend(raw.exec.map(StepKind::Exec));
        kinds.extend(raw.container.map(StepKind::Container));
        kinds.extend(raw.collect.map(StepKind::Collect));

        let label = raw.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
        if kinds.len() > 1 {
            let found: Vec<&str> = kinds.iter().map(StepKind::label).collect();
            return Err(format!(
                "step '{}' declares more than one kind ({}); use exactly one of fetch, render, exec, container, collect",
                label,
                found.join(", ")
            ));
        }

        let kind = kinds.pop().ok_or_else(|| {
            format!(
                "step '{}' declares no kind; use exactly one of fetch, render, exec, container, collect",
                label
            )
        })?;

        let name = raw.name.unwrap_or_else(|| kind.label().to_string());
        Ok(Step { name, kind })
    }
}

impl From<Step> for RawStep {
    fn from(step: Step) -> Self {
        let mut raw = RawStep {
            name: Some(step.name),
            ..Default::default()
        };
        match step.kind {
            StepKind::Fetch(spec) => raw.fetch = Some(spec),
            StepKind::Render(spec) => raw.render = Some(spec),
            StepKind::Exec(spec) => raw.exec = Some(spec),
            StepKind::Container(spec) => raw.container = Some(spec),
            StepKind::Collect(spec) => raw.collect = Some(spec),
        }
        raw
    }
}

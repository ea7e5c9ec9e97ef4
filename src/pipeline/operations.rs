//! Pipeline loading, lookup and static validation.

use super::BUILTIN_VARIABLES;
use super::model::{Pipeline, Step, StepKind};
use super::{builtin, builtin_names};
use crate::error::{PipewrightError, Result};
use crate::params::is_valid_param_name;
use crate::template::{Bindings, placeholders, render_template};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static PIPELINE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("Invalid pipeline name regex")
});

impl Pipeline {
    /// Load a pipeline definition from a YAML file.
    ///
    /// `template_file` paths in the definition resolve against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            PipewrightError::UserError(format!(
                "failed to read pipeline file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut pipeline = Self::from_yaml(&content).map_err(|e| {
            PipewrightError::UserError(format!("{} (in '{}')", e, path.display()))
        })?;
        pipeline.base_dir = path
            .canonicalize()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));
        Ok(pipeline)
    }

    /// Parse and validate a pipeline definition.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let pipeline: Pipeline = serde_yaml::from_str(yaml).map_err(|e| {
            PipewrightError::UserError(format!("failed to parse pipeline YAML: {}", e))
        })?;

        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            PipewrightError::UserError(format!("failed to serialize pipeline to YAML: {}", e))
        })
    }

    /// Resolve `name_or_path`: an existing file is loaded from disk,
    /// anything else is looked up among the built-in pipelines.
    pub fn find(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.is_file() {
            return Self::load(path);
        }

        match builtin(name_or_path) {
            Some(pipeline) => pipeline,
            None => Err(PipewrightError::UserError(format!(
                "unknown pipeline '{}': not a file and not a built-in ({})",
                name_or_path,
                builtin_names().join(", ")
            ))),
        }
    }

    /// Validate structure and every template a step will render.
    ///
    /// Validation rules:
    /// - pipeline name matches `^[a-z0-9][a-z0-9_-]*$`
    /// - parameters are individually valid, unique, and do not shadow built-ins
    /// - step names are non-empty and unique; required step fields are set
    /// - every placeholder refers to a parameter, a built-in, or (inside a
    ///   render template) a step-local binding
    pub fn validate(&self) -> Result<()> {
        if !PIPELINE_NAME_REGEX.is_match(&self.name) {
            return Err(PipewrightError::UserError(format!(
                "pipeline validation failed: invalid name '{}' (use lowercase letters, digits, '-' and '_')",
                self.name
            )));
        }

        let mut param_names = HashSet::new();
        for param in &self.parameters {
            param.validate()?;
            if BUILTIN_VARIABLES.contains(&param.name.as_str()) {
                return Err(PipewrightError::UserError(format!(
                    "pipeline validation failed: parameter '{}' shadows a built-in variable",
                    param.name
                )));
            }
            if !param_names.insert(param.name.as_str()) {
                return Err(PipewrightError::UserError(format!(
                    "pipeline validation failed: duplicate parameter '{}'",
                    param.name
                )));
            }
        }

        let mut step_names = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(PipewrightError::UserError(
                    "pipeline validation failed: step name must not be empty".to_string(),
                ));
            }
            if !step_names.insert(step.name.as_str()) {
                return Err(PipewrightError::UserError(format!(
                    "pipeline validation failed: duplicate step name '{}'",
                    step.name
                )));
            }
            validate_required_fields(step)?;
        }

        self.check_templates()
    }

    /// Render every step field against placeholder values for the known
    /// variables, so an unbound `$name` is reported before anything runs.
    fn check_templates(&self) -> Result<()> {
        let mut known: Bindings = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), String::new()))
            .collect();
        for var in BUILTIN_VARIABLES {
            known.insert(var.to_string(), String::new());
        }

        for step in &self.steps {
            for (field, text) in template_fields(&step.kind) {
                render_template(text, &known).map_err(|e| {
                    PipewrightError::template(
                        format!("step '{}' field '{}'", step.name, field),
                        e,
                    )
                })?;
            }

            if let StepKind::Render(spec) = &step.kind {
                let mut local = known.clone();
                for key in spec.bindings.keys() {
                    if !is_valid_param_name(key) {
                        return Err(PipewrightError::UserError(format!(
                            "pipeline validation failed: step '{}' binding '{}' is not a valid variable name",
                            step.name, key
                        )));
                    }
                    local.insert(key.clone(), String::new());
                }
                if let Some(template) = &spec.template {
                    render_template(template, &local).map_err(|e| {
                        PipewrightError::template(
                            format!("step '{}' field 'template'", step.name),
                            e,
                        )
                    })?;
                }
            }
        }

        Ok(())
    }
}

impl Step {
    /// Variables this step reads from the run bindings, in first-appearance
    /// order. Step-local render bindings are not included.
    pub fn variables(&self) -> Result<Vec<String>> {
        let mut texts: Vec<&str> = template_fields(&self.kind)
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        if let StepKind::Render(spec) = &self.kind
            && let Some(template) = &spec.template
        {
            texts.push(template);
        }

        let mut names: Vec<String> = Vec::new();
        for text in texts {
            let found = placeholders(text)
                .map_err(|e| PipewrightError::template(format!("step '{}'", self.name), e))?;
            for name in found {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        if let StepKind::Render(spec) = &self.kind {
            names.retain(|name| !spec.bindings.contains_key(name));
        }
        Ok(names)
    }
}

/// Every field rendered against the run bindings, with a display label.
/// The inline render template is excluded (it also sees step-local bindings).
pub(crate) fn template_fields(kind: &StepKind) -> Vec<(String, &str)> {
    let mut fields: Vec<(String, &str)> = Vec::new();
    match kind {
        StepKind::Fetch(spec) => {
            fields.push(("url".to_string(), &spec.url));
            fields.push(("branch".to_string(), &spec.branch));
            fields.push(("dest".to_string(), &spec.dest));
            if let Some(key) = &spec.ssh_key {
                fields.push(("ssh_key".to_string(), key));
            }
        }
        StepKind::Render(spec) => {
            if let Some(file) = &spec.template_file {
                fields.push(("template_file".to_string(), file));
            }
            fields.push(("dest".to_string(), &spec.dest));
            for (key, value) in &spec.bindings {
                fields.push((format!("bindings.{}", key), value));
            }
        }
        StepKind::Exec(spec) => {
            fields.push(("command".to_string(), &spec.command));
            if let Some(cwd) = &spec.cwd {
                fields.push(("cwd".to_string(), cwd));
            }
            for (key, value) in &spec.env {
                fields.push((format!("env.{}", key), value));
            }
            if let Some(cleanup) = &spec.cleanup {
                fields.push(("cleanup".to_string(), cleanup));
            }
        }
        StepKind::Container(spec) => {
            fields.push(("image".to_string(), &spec.image));
            fields.push(("name".to_string(), &spec.name));
            for port in &spec.ports {
                fields.push(("ports".to_string(), port));
            }
            for (key, value) in &spec.env {
                fields.push((format!("env.{}", key), value));
            }
            for arg in &spec.args {
                fields.push(("args".to_string(), arg));
            }
            if let Some(verify) = &spec.verify {
                fields.push(("verify".to_string(), verify));
            }
        }
        StepKind::Collect(spec) => {
            for pattern in &spec.patterns {
                fields.push(("patterns".to_string(), pattern));
            }
            if let Some(from) = &spec.from {
                fields.push(("from".to_string(), from));
            }
        }
    }
    fields
}

fn validate_required_fields(step: &Step) -> Result<()> {
    let missing = |field: &str| {
        Err(PipewrightError::UserError(format!(
            "pipeline validation failed: step '{}' ({}) requires a non-empty '{}'",
            step.name, step.kind, field
        )))
    };

    match &step.kind {
        StepKind::Fetch(spec) => {
            if spec.url.trim().is_empty() {
                return missing("url");
            }
            if spec.dest.trim().is_empty() {
                return missing("dest");
            }
        }
        StepKind::Render(spec) => {
            if spec.dest.trim().is_empty() {
                return missing("dest");
            }
            match (&spec.template, &spec.template_file) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => {
                    return Err(PipewrightError::UserError(format!(
                        "pipeline validation failed: step '{}' (render) needs exactly one of 'template' or 'template_file'",
                        step.name
                    )));
                }
            }
        }
        StepKind::Exec(spec) => {
            if spec.command.trim().is_empty() {
                return missing("command");
            }
        }
        StepKind::Container(spec) => {
            if spec.image.trim().is_empty() {
                return missing("image");
            }
            if spec.name.trim().is_empty() {
                return missing("name");
            }
        }
        StepKind::Collect(spec) => {
            if spec.patterns.iter().all(|p| p.trim().is_empty()) {
                return missing("patterns");
            }
        }
    }

    Ok(())
}

//! Parameter lookup, the not-ready sentinel, and the frozen parameter set.

use super::spec::{ParamKind, ParamSpec};
use crate::error::{PipewrightError, Result};
use crate::template::Bindings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;

/// Where parameter values come from.
///
/// Explicit overrides (`--param name=value`) win over environment variables
/// with the exact parameter name.
#[derive(Debug, Clone, Default)]
pub struct ParamSource {
    pub overrides: BTreeMap<String, String>,
    pub env: BTreeMap<String, String>,
}

impl ParamSource {
    /// Build a source from the process environment plus CLI overrides.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped; they
    /// can never match a parameter name.
    pub fn from_env(overrides: BTreeMap<String, String>) -> Self {
        Self::from_vars(overrides, std::env::vars_os())
    }

    /// Build a source from explicit variables (same rules as [`from_env`]).
    ///
    /// [`from_env`]: ParamSource::from_env
    pub fn from_vars<I>(overrides: BTreeMap<String, String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let env = vars
            .into_iter()
            .filter_map(|(key, value)| {
                Some((key.into_string().ok()?, value.into_string().ok()?))
            })
            .collect();
        Self { overrides, env }
    }

    /// Build a source from overrides only (no environment).
    pub fn from_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self {
            overrides,
            env: BTreeMap::new(),
        }
    }

    /// Parse `--param` values of the form `name=value`.
    pub fn parse_overrides<S: AsRef<str>>(pairs: &[S]) -> Result<BTreeMap<String, String>> {
        let mut overrides = BTreeMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                PipewrightError::UserError(format!(
                    "invalid parameter '{}': expected name=value",
                    pair
                ))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(PipewrightError::UserError(format!(
                    "invalid parameter '{}': name is empty",
                    pair
                )));
            }
            overrides.insert(name.to_string(), value.to_string());
        }
        Ok(overrides)
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.overrides
            .get(name)
            .or_else(|| self.env.get(name))
            .map(String::as_str)
    }
}

/// The accepted parameter set, emitted when a run cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    pub pipeline: String,
    pub parameters: Vec<ParamSpec>,
    /// Required parameters that were not supplied (empty when only declaring).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ParameterDeclaration {
    pub fn new(pipeline: impl Into<String>, parameters: Vec<ParamSpec>) -> Self {
        Self {
            pipeline: pipeline.into(),
            parameters,
            missing: Vec::new(),
        }
    }

    /// Plain-text table for terminals.
    pub fn to_table(&self) -> String {
        let width = self
            .parameters
            .iter()
            .map(|p| p.name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        let mut out = format!(
            "Parameters for '{}':\n\n  {:<width$}  {:<8}  {:<9}  {:<16}  DESCRIPTION\n",
            self.pipeline,
            "NAME",
            "TYPE",
            "REQUIRED",
            "DEFAULT",
            width = width
        );

        for p in &self.parameters {
            let default = match p.kind {
                ParamKind::Choice => p.choices.join("|"),
                ParamKind::Password if p.default.is_some() => "****".to_string(),
                _ => p.default.clone().unwrap_or_default(),
            };
            let marker = if self.missing.contains(&p.name) {
                "  (missing)"
            } else {
                ""
            };
            out.push_str(&format!(
                "  {:<width$}  {:<8}  {:<9}  {:<16}  {}{}\n",
                p.name,
                p.kind.to_string(),
                if p.is_required() { "yes" } else { "no" },
                default,
                p.description,
                marker,
                width = width
            ));
        }

        out
    }
}

/// Outcome of the pre-flight check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight {
    /// Every required parameter was supplied.
    Ready(Params),
    /// Required parameters are absent; nothing may run.
    NotReady(ParameterDeclaration),
}

impl Preflight {
    /// Turn the not-ready sentinel into a `MissingParameter` error.
    pub fn into_params(self) -> Result<Params> {
        match self {
            Preflight::Ready(params) => Ok(params),
            Preflight::NotReady(decl) => Err(PipewrightError::MissingParameter(decl.missing)),
        }
    }
}

/// Resolve `specs` against `source`.
///
/// A required parameter supplied as an empty string counts as missing.
pub fn preflight(pipeline: &str, specs: &[ParamSpec], source: &ParamSource) -> Result<Preflight> {
    let mut values = BTreeMap::new();
    let mut secrets = Vec::new();
    let mut missing = Vec::new();

    for spec in specs {
        let value = match source.lookup(&spec.name) {
            Some(raw) if !(spec.is_required() && raw.trim().is_empty()) => spec.normalize(raw)?,
            _ if spec.is_required() => {
                missing.push(spec.name.clone());
                continue;
            }
            _ => spec.fallback(),
        };

        if spec.is_secret() && !value.is_empty() {
            secrets.push(value.clone());
        }
        values.insert(spec.name.clone(), value);
    }

    if !missing.is_empty() {
        return Ok(Preflight::NotReady(ParameterDeclaration {
            pipeline: pipeline.to_string(),
            parameters: specs.to_vec(),
            missing,
        }));
    }

    Ok(Preflight::Ready(Params { values, secrets }))
}

/// Immutable parameter values for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
    secrets: Vec<String>,
}

impl Params {
    /// Build a parameter set directly (no declaration, nothing secret).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            secrets: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values of password parameters, for masking.
    pub fn secrets(&self) -> &[String] {
        &self.secrets
    }

    /// A fresh binding map seeded with every parameter.
    pub fn bindings(&self) -> Bindings {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

//! Parameter declarations.

use crate::error::{PipewrightError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static PARAM_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid param name regex"));

/// Whether `name` can be used both as a placeholder and an env var name.
pub fn is_valid_param_name(name: &str) -> bool {
    PARAM_NAME_REGEX.is_match(name)
}

/// Value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Single-line string (default).
    #[default]
    String,
    /// Multi-line string.
    Text,
    /// `true` / `false`.
    Boolean,
    /// One of a fixed list of choices.
    Choice,
    /// String that is masked in logs and the run log.
    Password,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::String => write!(f, "string"),
            ParamKind::Text => write!(f, "text"),
            ParamKind::Boolean => write!(f, "boolean"),
            ParamKind::Choice => write!(f, "choice"),
            ParamKind::Password => write!(f, "password"),
        }
    }
}

/// One accepted parameter: name, type, default, description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ParamKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    pub description: String,

    /// Allowed values for `choice` parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    /// Overrides the derived requiredness (see [`ParamSpec::is_required`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// A parameter is required unless it has a natural fallback: an explicit
    /// default, a boolean (`false`), or a choice (its first choice).
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(match self.kind {
            ParamKind::Boolean | ParamKind::Choice => false,
            ParamKind::String | ParamKind::Text | ParamKind::Password => self.default.is_none(),
        })
    }

    pub fn is_secret(&self) -> bool {
        self.kind == ParamKind::Password
    }

    /// Value used when the parameter is not supplied.
    pub fn fallback(&self) -> String {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match self.kind {
            ParamKind::Boolean => "false".to_string(),
            ParamKind::Choice => self.choices.first().cloned().unwrap_or_default(),
            ParamKind::String | ParamKind::Text | ParamKind::Password => String::new(),
        }
    }

    /// Check a supplied value against the parameter type and normalize it.
    pub fn normalize(&self, raw: &str) -> Result<String> {
        match self.kind {
            ParamKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok("true".to_string()),
                "false" | "no" | "0" => Ok("false".to_string()),
                _ => Err(PipewrightError::UserError(format!(
                    "parameter '{}' must be a boolean (true/false), got '{}'",
                    self.name, raw
                ))),
            },
            ParamKind::Choice => {
                if self.choices.iter().any(|c| c == raw) {
                    Ok(raw.to_string())
                } else {
                    Err(PipewrightError::UserError(format!(
                        "parameter '{}' must be one of [{}], got '{}'",
                        self.name,
                        self.choices.join(", "),
                        raw
                    )))
                }
            }
            ParamKind::String | ParamKind::Password => Ok(raw.trim().to_string()),
            ParamKind::Text => Ok(raw.to_string()),
        }
    }

    /// Structural checks run when a pipeline definition is loaded.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_param_name(&self.name) {
            return Err(PipewrightError::UserError(format!(
                "invalid parameter name '{}': use letters, digits and '_' (not starting with a digit)",
                self.name
            )));
        }

        if self.kind == ParamKind::Choice {
            if self.choices.is_empty() {
                return Err(PipewrightError::UserError(format!(
                    "choice parameter '{}' declares no choices",
                    self.name
                )));
            }
            if let Some(default) = &self.default
                && !self.choices.contains(default)
            {
                return Err(PipewrightError::UserError(format!(
                    "default '{}' of choice parameter '{}' is not one of its choices",
                    default, self.name
                )));
            }
        } else if !self.choices.is_empty() {
            return Err(PipewrightError::UserError(format!(
                "parameter '{}' declares choices but its type is '{}'",
                self.name, self.kind
            )));
        }

        if self.kind == ParamKind::Boolean
            && let Some(default) = &self.default
        {
            self.normalize(default)?;
        }

        Ok(())
    }
}

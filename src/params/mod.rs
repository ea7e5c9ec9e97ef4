//! Pipeline parameters and the pre-flight handshake.
//!
//! A pipeline declares the parameters it accepts. Before any step runs,
//! [`preflight`] looks each one up (CLI overrides first, then environment
//! variables of the same name). When a required parameter is absent the
//! result is [`Preflight::NotReady`], carrying the full declaration so the
//! operator can re-invoke with values supplied. Otherwise the values are
//! frozen into an immutable [`Params`] that is handed to the workflow.

mod preflight;
mod spec;

#[cfg(test)]
mod tests;

pub use preflight::{ParamSource, ParameterDeclaration, Params, Preflight, preflight};
pub use spec::{ParamKind, ParamSpec, is_valid_param_name};

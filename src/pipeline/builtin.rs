//! Pipelines shipped with the binary.

use super::model::Pipeline;
use crate::error::Result;

const BUILTINS: [(&str, &str); 3] = [
    (
        "python-remote",
        include_str!("../../pipelines/python-remote.yaml"),
    ),
    (
        "zabbix-agent",
        include_str!("../../pipelines/zabbix-agent.yaml"),
    ),
    ("go-docker", include_str!("../../pipelines/go-docker.yaml")),
];

/// Names of the built-in pipelines, in listing order.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|(name, _)| *name).collect()
}

/// Parse the built-in pipeline called `name`, if there is one.
pub fn builtin(name: &str) -> Option<Result<Pipeline>> {
    BUILTINS
        .iter()
        .find(|(builtin_name, _)| *builtin_name == name)
        .map(|(_, yaml)| Pipeline::from_yaml(yaml))
}

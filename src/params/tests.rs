//! Tests for parameter declarations and the pre-flight check.

use super::*;
use crate::error::PipewrightError;
use std::collections::BTreeMap;

fn specs() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new("repo_url", ParamKind::String).with_description("Repository to clone"),
        ParamSpec::new("branch", ParamKind::String).with_default("main"),
        ParamSpec::new("verbose", ParamKind::Boolean),
        ParamSpec::new("agent_version", ParamKind::Choice).with_choices(["6.0", "6.4"]),
        ParamSpec::new("token", ParamKind::Password).with_default(""),
    ]
}

fn source(pairs: &[(&str, &str)]) -> ParamSource {
    ParamSource::from_overrides(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn test_ready_uses_supplied_values_and_fallbacks() {
    let result = preflight("demo", &specs(), &source(&[("repo_url", "git@example.com:a.git")])).unwrap();

    let Preflight::Ready(params) = result else {
        panic!("expected Ready");
    };
    assert_eq!(params.get("repo_url"), Some("git@example.com:a.git"));
    assert_eq!(params.get("branch"), Some("main"));
    assert_eq!(params.get("verbose"), Some("false"));
    assert_eq!(params.get("agent_version"), Some("6.0"));
    assert_eq!(params.get("token"), Some(""));
    assert_eq!(params.len(), 5);
}

#[test]
fn test_not_ready_declares_full_parameter_set() {
    let result = preflight("demo", &specs(), &ParamSource::default()).unwrap();

    let Preflight::NotReady(decl) = result else {
        panic!("expected NotReady");
    };
    assert_eq!(decl.pipeline, "demo");
    assert_eq!(decl.missing, vec!["repo_url"]);
    assert_eq!(decl.parameters.len(), 5);
    assert_eq!(decl.parameters[0].description, "Repository to clone");
}

#[test]
fn test_empty_required_value_counts_as_missing() {
    let result = preflight("demo", &specs(), &source(&[("repo_url", "  ")])).unwrap();
    assert!(matches!(result, Preflight::NotReady(_)));
}

#[test]
fn test_into_params_maps_not_ready_to_missing_parameter() {
    let err = preflight("demo", &specs(), &ParamSource::default())
        .unwrap()
        .into_params()
        .unwrap_err();
    match err {
        PipewrightError::MissingParameter(names) => assert_eq!(names, vec!["repo_url"]),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_overrides_win_over_environment() {
    let mut src = source(&[("repo_url", "from-cli")]);
    src.env.insert("repo_url".to_string(), "from-env".to_string());
    src.env.insert("branch".to_string(), "develop".to_string());

    let params = preflight("demo", &specs(), &src).unwrap().into_params().unwrap();
    assert_eq!(params.get("repo_url"), Some("from-cli"));
    assert_eq!(params.get("branch"), Some("develop"));
}

#[test]
fn test_boolean_values_are_normalized() {
    let params = preflight(
        "demo",
        &specs(),
        &source(&[("repo_url", "x"), ("verbose", "YES")]),
    )
    .unwrap()
    .into_params()
    .unwrap();
    assert_eq!(params.get("verbose"), Some("true"));

    let err = preflight(
        "demo",
        &specs(),
        &source(&[("repo_url", "x"), ("verbose", "maybe")]),
    )
    .unwrap_err();
    assert!(err.to_string().contains("must be a boolean"));
}

#[test]
fn test_choice_must_be_declared() {
    let err = preflight(
        "demo",
        &specs(),
        &source(&[("repo_url", "x"), ("agent_version", "5.0")]),
    )
    .unwrap_err();
    assert!(err.to_string().contains("must be one of [6.0, 6.4]"));
}

#[test]
fn test_password_values_are_secrets() {
    let params = preflight(
        "demo",
        &specs(),
        &source(&[("repo_url", "x"), ("token", "hunter2")]),
    )
    .unwrap()
    .into_params()
    .unwrap();
    assert_eq!(params.secrets(), &["hunter2".to_string()]);
}

#[test]
fn test_bindings_contain_every_parameter() {
    let params = Params::from_pairs([("h", "10.0.0.1"), ("u", "admin")]);
    let bindings = params.bindings();
    assert_eq!(bindings.get("h").map(String::as_str), Some("10.0.0.1"));
    assert_eq!(bindings.get("u").map(String::as_str), Some("admin"));
}

#[test]
fn test_parse_overrides() {
    let parsed = ParamSource::parse_overrides(&["a=1", "b=x=y", "c="]).unwrap();
    let expected: BTreeMap<String, String> = [("a", "1"), ("b", "x=y"), ("c", "")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(parsed, expected);

    assert!(ParamSource::parse_overrides(&["novalue"]).is_err());
    assert!(ParamSource::parse_overrides(&["=value"]).is_err());
}

#[test]
fn test_requiredness() {
    assert!(ParamSpec::new("a", ParamKind::String).is_required());
    assert!(!ParamSpec::new("a", ParamKind::String).with_default("").is_required());
    assert!(!ParamSpec::new("a", ParamKind::Boolean).is_required());

    let mut forced = ParamSpec::new("a", ParamKind::Boolean);
    forced.required = Some(true);
    assert!(forced.is_required());
}

#[test]
fn test_spec_validation() {
    assert!(ParamSpec::new("ok_name", ParamKind::String).validate().is_ok());
    assert!(ParamSpec::new("1bad", ParamKind::String).validate().is_err());
    assert!(ParamSpec::new("has-dash", ParamKind::String).validate().is_err());
    assert!(ParamSpec::new("c", ParamKind::Choice).validate().is_err());
    assert!(
        ParamSpec::new("c", ParamKind::Choice)
            .with_choices(["a"])
            .with_default("b")
            .validate()
            .is_err()
    );
    assert!(
        ParamSpec::new("s", ParamKind::String)
            .with_choices(["a"])
            .validate()
            .is_err()
    );
    assert!(
        ParamSpec::new("b", ParamKind::Boolean)
            .with_default("nope")
            .validate()
            .is_err()
    );
}

#[test]
fn test_declaration_table_marks_missing() {
    let Preflight::NotReady(decl) = preflight("demo", &specs(), &ParamSource::default()).unwrap()
    else {
        panic!("expected NotReady");
    };
    let table = decl.to_table();
    assert!(table.contains("Parameters for 'demo'"));
    assert!(table.contains("repo_url"));
    assert!(table.contains("(missing)"));
    assert!(table.contains("6.0|6.4"));
}

#[test]
fn test_spec_yaml_shape() {
    let yaml = r#"
- name: servers_active
  type: string
  default: "127.0.0.1"
  description: Active check servers
- name: mode
  type: choice
  choices: [default, custom]
"#;
    let parsed: Vec<ParamSpec> = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(parsed[0].kind, ParamKind::String);
    assert_eq!(parsed[0].default.as_deref(), Some("127.0.0.1"));
    assert_eq!(parsed[1].kind, ParamKind::Choice);
    assert_eq!(parsed[1].choices, vec!["default", "custom"]);
}

#[cfg(unix)]
#[test]
fn test_env_source_skips_non_utf8_variables() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let vars = vec![
        (OsString::from("LC_GARBLED"), OsString::from_vec(vec![0xff, 0xfe])),
        (OsString::from_vec(vec![b'X', 0xff]), OsString::from("ignored")),
        (
            OsString::from("repo_url"),
            OsString::from("git@example.com:app.git"),
        ),
    ];
    let source = ParamSource::from_vars(BTreeMap::new(), vars);

    assert_eq!(source.env.len(), 1);
    let Preflight::Ready(params) = preflight("demo", &specs(), &source).unwrap() else {
        panic!("expected Ready");
    };
    assert_eq!(params.get("repo_url"), Some("git@example.com:app.git"));
}

#[test]
fn test_env_source_reads_process_environment() {
    let source = ParamSource::from_env(BTreeMap::new());
    assert!(
        std::env::vars_os()
            .filter_map(|(k, _)| k.into_string().ok())
            .all(|k| source.env.contains_key(&k))
    );
}

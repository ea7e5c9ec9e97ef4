//! Tests for pipeline definitions.

use super::*;
use crate::error::PipewrightError;
use crate::params::ParamKind;
use tempfile::TempDir;

const MINIMAL: &str = r#"
name: demo
parameters:
  - name: host
    type: string
steps:
  - name: inventory
    render:
      template: "hosts=$host\n"
      dest: inventory.ini
  - name: apply
    exec:
      command: ansible-playbook -i inventory.ini site.yml
"#;

#[test]
fn test_parse_minimal_pipeline() {
    let pipeline = Pipeline::from_yaml(MINIMAL).unwrap();

    assert_eq!(pipeline.name, "demo");
    assert_eq!(pipeline.parameters.len(), 1);
    assert_eq!(pipeline.parameters[0].kind, ParamKind::String);
    assert_eq!(pipeline.steps.len(), 2);
    assert_eq!(pipeline.steps[0].name, "inventory");
    assert!(matches!(pipeline.steps[0].kind, StepKind::Render(_)));
    match &pipeline.steps[1].kind {
        StepKind::Exec(spec) => {
            assert_eq!(spec.command, "ansible-playbook -i inventory.ini site.yml");
            assert!(spec.cwd.is_none());
        }
        other => panic!("unexpected kind: {:?}", other),
    }
}

#[test]
fn test_step_name_defaults_to_kind() {
    let yaml = r#"
name: demo
steps:
  - exec: { command: "true" }
"#;
    let pipeline = Pipeline::from_yaml(yaml).unwrap();
    assert_eq!(pipeline.steps[0].name, "exec");
}

#[test]
fn test_fetch_dest_defaults_to_src() {
    let yaml = r#"
name: demo
steps:
  - fetch: { url: "https://example.com/repo.git" }
"#;
    let pipeline = Pipeline::from_yaml(yaml).unwrap();
    match &pipeline.steps[0].kind {
        StepKind::Fetch(spec) => {
            assert_eq!(spec.dest, "src");
            assert_eq!(spec.branch, "");
        }
        other => panic!("unexpected kind: {:?}", other),
    }
}

#[test]
fn test_step_with_two_kinds_is_rejected() {
    let yaml = r#"
name: demo
steps:
  - name: confused
    exec: { command: "true" }
    collect: { patterns: ["*.txt"] }
"#;
    let err = Pipeline::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("more than one kind"));
}

#[test]
fn test_step_with_no_kind_is_rejected() {
    let yaml = r#"
name: demo
steps:
  - name: empty
"#;
    let err = Pipeline::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("declares no kind"));
}

#[test]
fn test_unknown_step_key_is_rejected() {
    let yaml = r#"
name: demo
steps:
  - name: typo
    exce: { command: "true" }
"#;
    assert!(Pipeline::from_yaml(yaml).is_err());
}

#[test]
fn test_unbound_placeholder_is_a_template_error() {
    let yaml = r#"
name: demo
parameters:
  - name: host
steps:
  - name: apply
    exec:
      command: ssh $user@$host uptime
"#;
    let err = Pipeline::from_yaml(yaml).unwrap_err();
    match err {
        PipewrightError::Template { context, source } => {
            assert_eq!(context, "step 'apply' field 'command'");
            assert_eq!(source.variable(), Some("user"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_builtins_and_step_bindings_are_known() {
    let yaml = r#"
name: demo
parameters:
  - name: passive
steps:
  - name: conf
    render:
      dest: agent.conf
      bindings:
        server_line: "Server=$passive"
      template: "$server_line\n# run $run_id in $workspace, artifacts in $artifacts_dir\n"
"#;
    assert!(Pipeline::from_yaml(yaml).is_ok());
}

#[test]
fn test_step_bindings_are_not_visible_to_other_fields() {
    let yaml = r#"
name: demo
steps:
  - name: conf
    render:
      dest: $local.conf
      bindings:
        local: x
      template: "$local"
"#;
    let err = Pipeline::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("field 'dest'"));
}

#[test]
fn test_validation_rules() {
    let cases = [
        ("name: Bad_Name\n", "invalid name"),
        (
            "name: demo\nparameters:\n  - name: workspace\n",
            "shadows a built-in",
        ),
        (
            "name: demo\nparameters:\n  - name: a\n  - name: a\n",
            "duplicate parameter",
        ),
        (
            "name: demo\nsteps:\n  - exec: { command: \"true\" }\n  - exec: { command: \"false\" }\n",
            "duplicate step name",
        ),
        (
            "name: demo\nsteps:\n  - exec: { command: \"\" }\n",
            "requires a non-empty 'command'",
        ),
        (
            "name: demo\nsteps:\n  - container: { image: alpine }\n",
            "requires a non-empty 'name'",
        ),
        (
            "name: demo\nsteps:\n  - render: { dest: out.txt }\n",
            "exactly one of 'template' or 'template_file'",
        ),
        (
            "name: demo\nsteps:\n  - collect: { patterns: [] }\n",
            "requires a non-empty 'patterns'",
        ),
    ];

    for (yaml, expected) in cases {
        let err = Pipeline::from_yaml(yaml).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "expected '{}' in '{}'",
            expected,
            err
        );
    }
}

#[test]
fn test_builtin_pipelines_parse_and_validate() {
    for name in builtin_names() {
        let pipeline = builtin(name).unwrap().unwrap();
        assert_eq!(pipeline.name, name);
        assert!(!pipeline.description.is_empty());
        assert!(!pipeline.steps.is_empty());
    }
    assert!(builtin("nope").is_none());
}

#[test]
fn test_zabbix_binds_active_and_passive_separately() {
    let pipeline = builtin("zabbix-agent").unwrap().unwrap();
    let names: Vec<&str> = pipeline.parameters.iter().map(|p| p.name.as_str()).collect();
    assert!(names.contains(&"servers_passive"));
    assert!(names.contains(&"servers_active"));

    let playbook = pipeline
        .steps
        .iter()
        .find_map(|s| match &s.kind {
            StepKind::Render(spec) if spec.dest == "playbook.yml" => spec.template.clone(),
            _ => None,
        })
        .unwrap();
    assert!(playbook.contains("\"$servers_passive\""));
    assert!(playbook.contains("\"$servers_active\""));
}

#[test]
fn test_find_loads_files_and_builtins() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("demo.yaml");
    std::fs::write(&path, MINIMAL).unwrap();

    let from_file = Pipeline::find(path.to_str().unwrap()).unwrap();
    assert_eq!(from_file.name, "demo");
    assert_eq!(
        from_file.base_dir,
        Some(temp.path().canonicalize().unwrap())
    );

    let from_builtin = Pipeline::find("go-docker").unwrap();
    assert_eq!(from_builtin.name, "go-docker");
    assert!(from_builtin.base_dir.is_none());

    let err = Pipeline::find("does-not-exist").unwrap_err();
    assert!(err.to_string().contains("unknown pipeline"));
    assert!(err.to_string().contains("python-remote"));
}

#[test]
fn test_yaml_round_trip_keeps_steps() {
    let pipeline = Pipeline::from_yaml(MINIMAL).unwrap();
    let reparsed = Pipeline::from_yaml(&pipeline.to_yaml().unwrap()).unwrap();
    assert_eq!(reparsed, pipeline);
}

#[test]
fn test_go_docker_removes_build_image() {
    let pipeline = builtin("go-docker").unwrap().unwrap();
    let step = pipeline
        .steps
        .iter()
        .find(|s| s.name == "test-and-build")
        .unwrap();
    let StepKind::Exec(spec) = &step.kind else {
        panic!("expected exec step");
    };
    assert_eq!(
        spec.cleanup.as_deref(),
        Some("docker rmi -f ${image_name}-build:$run_id")
    );

    let yaml = r#"
name: demo
steps:
  - name: build
    exec: { command: "true", cleanup: "rm -rf $scratch" }
"#;
    let err = Pipeline::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("step 'build' field 'cleanup'"));
}

#[test]
fn test_step_variables() {
    let pipeline = builtin("python-remote").unwrap().unwrap();
    assert_eq!(
        pipeline.steps[0].variables().unwrap(),
        vec!["repo_url", "branch", "ssh_key"]
    );

    let yaml = r#"
name: demo
parameters:
  - name: passive
steps:
  - name: conf
    render:
      dest: $run_id.conf
      bindings:
        line: "Server=$passive"
      template: "$line\n$passive\n"
"#;
    let pipeline = Pipeline::from_yaml(yaml).unwrap();
    assert_eq!(
        pipeline.steps[0].variables().unwrap(),
        vec!["run_id", "passive"]
    );
}

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn schema(name: &str) -> String {
    format!("{}/../schemas/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn protoargs(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_protoargs"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run protoargs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_schema(dir: &tempfile::TempDir, file: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(file);
    fs::write(&path, contents).expect("failed to write schema");
    path
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_fixture_schemas() {
    let output = protoargs(&[
        "check",
        &schema("schema.yaml"),
        &schema("simple.json"),
        &schema("multi_command.yaml"),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Validated 3 schema file(s) for 5 command(s)."));
}

#[test]
fn check_rejects_ambiguous_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_schema(
        &dir,
        "bad.json",
        r#"{"name": "program", "fields": [
            {"name": "a", "type": "string", "short": "x"},
            {"name": "b", "type": "string", "short": "x"}
        ]}"#,
    );

    let output = protoargs(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("duplicate short flag: -x"));
    assert!(stderr(&output).contains("error: 1 of 1 schema file(s) failed validation"));
}

#[test]
fn check_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_schema(&dir, "schema.proto", "message protoargs {}");

    let output = protoargs(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unsupported schema format"));
}

// ---------------------------------------------------------------------------
// usage
// ---------------------------------------------------------------------------

#[test]
fn usage_renders_root_and_subcommand() {
    let output = protoargs(&["usage", &schema("multi_command.yaml")]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("usage: program [-h] {create,copy} ..."));

    let output = protoargs(&["usage", &schema("multi_command.yaml"), "--command", "copy"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("usage: program copy [-h] [-r] SRC DST"));

    let output = protoargs(&[
        "usage",
        &schema("multi_command.yaml"),
        "--command",
        "create",
        "--program",
        "tool create",
    ]);
    assert!(stdout(&output).starts_with("usage: tool create [-h] [-s size] PATH"));
}

#[test]
fn usage_unknown_command_fails() {
    let output = protoargs(&["usage", &schema("multi_command.yaml"), "--command", "move"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown command 'move' (available: create, copy)"));
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_typed_configuration() {
    let output = protoargs(&[
        "parse",
        &schema("multi_command.yaml"),
        "--",
        "program",
        "create",
        "-s",
        "2048",
        "/tmp/tmp.file",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["program"], "program");
    assert_eq!(report["command"], "create");
    assert_eq!(report["subcommand"]["program"], "program create");
    assert_eq!(report["subcommand"]["config"]["size"], 2048);
    assert_eq!(report["subcommand"]["config"]["PATH"], "/tmp/tmp.file");
}

#[test]
fn parse_yaml_output() {
    let output = protoargs(&[
        "parse",
        &schema("simple.json"),
        "--format",
        "yaml",
        "--",
        "program",
        "--r-underscore",
        "x",
        "--flags",
        "--flags",
        "false",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("program: program"));
    assert!(out.contains("r_underscore: x"));
    assert!(out.contains("- true\n"));
    assert!(out.contains("- false\n"));
}

#[test]
fn parse_help_prints_usage_and_succeeds() {
    let output = protoargs(&["parse", &schema("multi_command.yaml"), "--", "program", "copy", "-h"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("usage: program copy [-h] [-r] SRC DST"));

    let output = protoargs(&["parse", &schema("schema.yaml"), "--", "program", "--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("usage: program [-h]"));
}

#[test]
fn parse_failure_prints_usage_and_error() {
    let output = protoargs(&["parse", &schema("schema.yaml"), "--", "program", "50", "0"]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.starts_with("usage: program [-h]"));
    assert!(err.contains("error: the following argument is required: -e"));
}

#[test]
fn parse_failure_in_subcommand_prints_its_usage() {
    let output = protoargs(&["parse", &schema("multi_command.yaml"), "--", "program", "copy", "/tmp/src"]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.starts_with("usage: program copy [-h] [-r] SRC DST"));
    assert!(err.contains("error: the following positional argument is required: DST"));
}

#[test]
fn parse_allow_incomplete_and_argc() {
    let output = protoargs(&[
        "parse",
        &schema("schema.yaml"),
        "--allow-incomplete",
        "--argc",
        "3",
        "--",
        "program",
        "-c",
        "-12",
        "not-examined",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["config"]["paramC"], -12);
    assert_eq!(report["config"]["paramA"], "// tricky default value");
    assert!(report.get("ignored").is_none());
}

// ---------------------------------------------------------------------------
// exclude
// ---------------------------------------------------------------------------

#[test]
fn exclude_drops_positions_and_ignores_out_of_range() {
    let output = protoargs(&[
        "exclude",
        "--positions",
        "2,50",
        "--",
        "program",
        "create",
        "-s",
        "2048",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), r#"["program","-s","2048"]"#);
}

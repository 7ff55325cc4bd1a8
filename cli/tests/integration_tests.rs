//! Integration tests for the doc-annotate binary.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn doc_annotate_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_doc-annotate"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(doc_annotate_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run doc-annotate")
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(doc_annotate_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn doc-annotate");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for doc-annotate")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn path_arg(name: &str) -> String {
    fixture(name).to_string_lossy().into_owned()
}

// ---- parse-file ----

#[test]
fn test_parse_file_json_output() {
    let input = path_arg("sort-docstring.txt");
    let output = run(&["parse-file", "--input", &input]);
    let json = stdout_json(&output);

    assert_eq!(json["Summary"]["short"], "Sort a file by one or more columns");
    assert_eq!(json["Input"]["infile"]["help"], "The file to sort");
    assert_eq!(json["Envs"]["ncores"]["attrs"]["type"], "int");
    assert_eq!(json["Envs"]["sort"]["terms"]["keys"]["help"], "Columns to sort by");
    assert_eq!(json["Examples"]["lines"][0], ">>> sort(infile='a.txt')");
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_parse_file_with_schema_backfills_and_warns() {
    let input = path_arg("sort-docstring.txt");
    let schema = path_arg("sort-schema.yaml");
    let output = run(&[
        "parse-file", "--input", &input, "--schema", &schema, "--name", "Sort",
    ]);
    let json = stdout_json(&output);

    assert_eq!(json["Input"]["infile"]["attrs"]["itype"], "file");
    assert_eq!(json["Input"]["weights"]["help"], "");
    assert_eq!(
        json["Output"]["outfile"]["attrs"]["default"],
        "{{in.infile | stem}}.sorted"
    );
    assert_eq!(json["Envs"]["ncores"]["attrs"]["default"], 1);
    assert_eq!(json["Envs"]["sort"]["attrs"]["action"], "namespace");
    assert_eq!(json["Envs"]["sort"]["terms"]["keys"]["attrs"]["action"], "clear_extend");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.trim(),
        "warning: missing annotation for Input: weights (Sort)"
    );
}

#[test]
fn test_deny_warnings_fails_after_printing() {
    let input = path_arg("sort-docstring.txt");
    let schema = path_arg("sort-schema.yaml");
    let output = run(&[
        "parse-file", "--input", &input, "--schema", &schema, "--deny-warnings",
    ]);

    assert!(!output.status.success());
    assert!(!output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning: missing annotation for Input: weights"));
    assert!(stderr.contains("error: 1 annotation warning(s)"));
}

#[test]
fn test_parse_file_yaml_output() {
    let input = path_arg("sort-docstring.txt");
    let output = run(&["parse-file", "--input", &input, "--format", "yaml"]);
    assert!(output.status.success());

    let yaml: serde_json::Value =
        serde_yaml::from_slice(&output.stdout).expect("stdout should be YAML");
    assert_eq!(yaml["Summary"]["short"], "Sort a file by one or more columns");
}

#[test]
fn test_parse_file_docstring_output_round_trips() {
    let input = path_arg("sort-docstring.txt");
    let first = run(&["parse-file", "--input", &input, "--format", "docstring"]);
    assert!(first.status.success());
    let rendered = String::from_utf8(first.stdout).expect("utf-8 output");
    assert!(rendered.starts_with("Sort a file by one or more columns\n"));

    let dir = tempfile::tempdir().expect("temp dir");
    let rendered_path = dir.path().join("rendered.txt");
    std::fs::write(&rendered_path, &rendered).expect("write rendered docstring");

    let original = stdout_json(&run(&["parse-file", "--input", &input]));
    let reparsed = stdout_json(&run(&[
        "parse-file",
        "--input",
        rendered_path.to_str().expect("utf-8 path"),
    ]));
    assert_eq!(original, reparsed);
}

#[test]
fn test_docstring_output_rejects_unwritable_default() {
    let dir = tempfile::tempdir().expect("temp dir");
    let schema = dir.path().join("schema.yaml");
    std::fs::write(&schema, "envs:\n  sep: \"a;b\"\n").expect("write schema");

    let output = run_with_stdin(
        &[
            "parse-stdin",
            "--schema",
            schema.to_str().expect("utf-8 path"),
            "--format",
            "docstring",
        ],
        "Split lines\n\nEnvs:\n    sep: Separator\n",
    );
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: cannot render section Envs: term sep"), "{stderr}");
    assert!(stderr.contains("contains ';'"), "{stderr}");

    let json = run_with_stdin(
        &["parse-stdin", "--schema", schema.to_str().expect("utf-8 path")],
        "Split lines\n\nEnvs:\n    sep: Separator\n",
    );
    assert_eq!(stdout_json(&json)["Envs"]["sep"]["attrs"]["default"], "a;b");
}

#[test]
fn test_parse_file_malformed_section() {
    let input = path_arg("malformed-docstring.txt");
    let output = run(&["parse-file", "--input", &input, "--name", "Broken"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: malformed annotation in Broken (section Args)"));
    assert!(stderr.contains("this line has no term header"));
}

#[test]
fn test_parse_file_missing_input() {
    let output = run(&["parse-file", "--input", "/nonexistent/docstring.txt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read"));
}

// ---- parse-stdin ----

#[test]
fn test_parse_stdin() {
    let output = run_with_stdin(
        &["parse-stdin"],
        "Add numbers\n\nArgs:\n    a (type=int): First\n    b (type=int): Second\n",
    );
    let json = stdout_json(&output);
    assert_eq!(json["Summary"]["short"], "Add numbers");
    assert_eq!(json["Args"]["b"]["attrs"]["type"], "int");
}

#[test]
fn test_parse_stdin_empty_input() {
    let output = run_with_stdin(&["parse-stdin"], "");
    let json = stdout_json(&output);
    assert_eq!(json, serde_json::json!({}));
}

// ---- catalog ----

#[test]
fn test_catalog_resolves_all_entities() {
    let catalog = path_arg("catalog.yaml");
    let output = run(&["catalog", "--input", &catalog]);
    let json = stdout_json(&output);

    let names: Vec<&String> = json.as_object().expect("object").keys().collect();
    assert_eq!(names, vec!["Process", "Sort", "Standalone"]);

    let sort_envs = &json["Sort"]["Envs"];
    assert_eq!(sort_envs["ncores"]["help"], "Cores, limited to a preset list");
    assert_eq!(sort_envs["ncores"]["attrs"]["type"], "int");
    assert_eq!(sort_envs["ncores"]["attrs"]["choices"], true);
    assert_eq!(sort_envs["tmpdir"]["attrs"]["default"], "/tmp");
    assert_eq!(json["Sort"]["Caveats"]["lines"][0], "Runs in a scratch directory.");

    let standalone = json["Standalone"].as_object().expect("object");
    assert_eq!(standalone.keys().collect::<Vec<_>>(), vec!["Summary"]);
}

#[test]
fn test_catalog_selected_entity() {
    let catalog = path_arg("catalog.yaml");
    let output = run(&["catalog", "--input", &catalog, "--entity", "Sort"]);
    let json = stdout_json(&output);
    assert_eq!(json.as_object().expect("object").len(), 1);
    assert_eq!(json["Sort"]["Summary"]["short"], "Sort a file");
}

#[test]
fn test_catalog_unknown_entity() {
    let catalog = path_arg("catalog.yaml");
    let output = run(&["catalog", "--input", &catalog, "--entity", "Nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown entity: Nope"));
}

#[test]
fn test_catalog_invalid_shortcut() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "sections:\n  Options: table\nentities: []\n").expect("write catalog");

    let output = run(&["catalog", "--input", path.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid section shortcut: table"));
    assert!(stderr.contains("summary, input, output, envs, items, text"));
}

// ---- sections ----

#[test]
fn test_sections_default_registry() {
    let output = run(&["sections"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line.starts_with("Envs ") && line.ends_with("envs")));
    assert!(stdout.lines().any(|line| line.starts_with("See Also ") && line.ends_with("text")));
    assert!(stdout.lines().any(|line| line.starts_with("Todo ")));
}

#[test]
fn test_sections_with_catalog() {
    let catalog = path_arg("catalog.yaml");
    let output = run(&["sections", "--catalog", &catalog]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line.starts_with("Caveats ") && line.ends_with("text")));
    assert!(!stdout.lines().any(|line| line.starts_with("Todo ")));
}

use assert_cmd::cargo;
use rstest::rstest;
use scopeguard::defer;
use std::io::Write;
use std::{fs::File, path::PathBuf};

pub fn create_file(name: &str, content: &str) -> (PathBuf, PathBuf) {
    let temp_dir = std::env::temp_dir();
    let temp_file_path = temp_dir.join(name);
    let mut file = File::create(&temp_file_path).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");

    (temp_dir, temp_file_path)
}

#[rstest]
#[case::static_mapping(
    vec!["[1, 2]"],
    "{}\n",
    "[1,2]\n")]
#[case::dynamic_mapping(
    vec![r#"{"id": json("doc.id")}"#],
    "{\"doc\": {\"id\": 1}}\n{\"doc\": {\"id\": 2}}\n",
    "{\"id\":1}\n{\"id\":2}\n")]
#[case::metadata(
    vec!["-M", "topic", "events", r#"[meta("topic")]"#],
    "{}\n",
    "[\"events\"]\n")]
#[case::pretty(
    vec!["-p", "[1]"],
    "{}\n",
    "[\n  1\n]\n")]
#[case::skips_blank_lines(
    vec![r#"json("a")"#],
    "{\"a\": 1}\n\n{\"a\": 2}\n",
    "1\n2\n")]
fn test_cli_run_with_stdin(#[case] args: Vec<&str>, #[case] stdin: &str, #[case] expected: &str) {
    let mut cmd = cargo::cargo_bin_cmd!("blobl");
    cmd.args(args)
        .write_stdin(stdin)
        .assert()
        .success()
        .code(0)
        .stdout(expected.to_string());
}

#[test]
fn test_cli_run_with_null_input() {
    let mut cmd = cargo::cargo_bin_cmd!("blobl");
    cmd.args(["-n", "{\"ok\": true}"])
        .assert()
        .success()
        .stdout("{\"ok\":true}\n");
}

#[test]
fn test_cli_run_with_mapping_file() {
    let (_, mapping_path) = create_file(
        "test_cli_run_with_mapping_file.blobl",
        r#"{"id": json("doc.id")}"#,
    );
    let mapping_arg = mapping_path.to_string_lossy().to_string();
    defer! {
        let _ = std::fs::remove_file(&mapping_path);
    }

    let mut cmd = cargo::cargo_bin_cmd!("blobl");
    cmd.args(["-f", &mapping_arg])
        .write_stdin("{\"doc\": {\"id\": 7}}\n")
        .assert()
        .success()
        .stdout("{\"id\":7}\n");
}

#[test]
fn test_cli_run_with_input_file() {
    let (_, input_path) = create_file(
        "test_cli_run_with_input_file.ndjson",
        "{\"a\": 1}\n{\"a\": 2}\n",
    );
    let input_arg = input_path.to_string_lossy().to_string();
    defer! {
        let _ = std::fs::remove_file(&input_path);
    }

    let mut cmd = cargo::cargo_bin_cmd!("blobl");
    cmd.args(["[json(\"a\")]", &input_arg])
        .assert()
        .success()
        .stdout("[1]\n[2]\n");
}

#[rstest]
#[case::trailing_comma("[1, 2,]")]
#[case::unknown_function("nope()")]
fn test_cli_reports_syntax_errors(#[case] mapping: &str) {
    let mut cmd = cargo::cargo_bin_cmd!("blobl");
    cmd.arg(mapping).write_stdin("{}\n").assert().failure();
}

#[test]
fn test_cli_reports_eval_errors() {
    let mut cmd = cargo::cargo_bin_cmd!("blobl");
    cmd.arg(r#"json("missing.path")"#)
        .write_stdin("{}\n")
        .assert()
        .failure();
}

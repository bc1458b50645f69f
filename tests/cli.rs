//! Integration tests for the sheetcalc binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn run_command(args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sheetcalc"))
        // Tests must not depend on a user's ~/.config/sheetcalc/config.toml.
        .arg("--config")
        .arg(Path::new(env!("CARGO_TARGET_TMPDIR")).join("no-such-config.toml"))
        .arg("--quiet")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn sheetcalc");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for sheetcalc");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is JSON")
}

const COST_SHEET: &str = r#"[
    {"1": "Session Hours", "2": "Rate per Hour", "3": "Total Cost"},
    {"1": "10", "2": "100", "3": "=A1 * B1"},
    {"1": "=C1 / 2", "2": "150", "3": "=A2 * B2"},
    {"1": "=C3 / B3", "2": "=B1 / 2", "3": "1200"}
]"#;

#[test]
fn test_evaluate_stdin_to_stdout() {
    let (stdout, _, code) = run_command(&[], COST_SHEET);
    assert_eq!(code, 0);
    assert_eq!(
        json(&stdout),
        serde_json::json!([
            {"1": "Session Hours", "2": "Rate per Hour", "3": "Total Cost"},
            {"1": "10", "2": "100", "3": "1000"},
            {"1": "500", "2": "150", "3": "75000"},
            {"1": "24", "2": "50", "3": "1200"}
        ])
    );
}

#[test]
fn test_error_cells_and_strict_mode() {
    let input = r#"[{}, {"1": "=B1", "2": "=A1", "3": "=5/0", "4": "=1+1"}]"#;

    let (stdout, stderr, code) = run_command(&["--explain"], input);
    assert_eq!(code, 0);
    assert_eq!(
        json(&stdout),
        serde_json::json!([{}, {"1": "#ERROR", "2": "#ERROR", "3": "#ERROR", "4": "2"}])
    );
    assert!(stderr.contains("A1: circular reference detected"));
    assert!(stderr.contains("C1: division by zero"));

    let (_, _, code) = run_command(&["--strict"], input);
    assert_eq!(code, 2);
}

#[test]
fn test_csv_file_to_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("costs.csv");
    let output = dir.path().join("out.csv");
    std::fs::write(&input, "Hours,Rate,Total\n10,2,=(A1+B1)\n").unwrap();

    let (_, _, code) = run_command(
        &[input.to_str().unwrap(), "-o", output.to_str().unwrap()],
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "Hours,Rate,Total\n10,2,12\n"
    );
}

#[test]
fn test_csv_multiline_field_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.csv");
    let output = dir.path().join("out.csv");
    let text = "Note,Total\n\"first line\nsecond line\",=2*3\n,=B1+1\n";
    std::fs::write(&input, text).unwrap();

    let (_, _, code) = run_command(
        &[input.to_str().unwrap(), "-o", output.to_str().unwrap()],
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "Note,Total\n\"first line\nsecond line\",6\n,7\n"
    );
}

#[test]
fn test_expr_mode() {
    let (stdout, _, code) = run_command(&["-e", "2+3*4"], "");
    assert_eq!(stdout.trim(), "14");
    assert_eq!(code, 0);

    let (stdout, _, code) = run_command(&["-e", "=(2+3)*4"], "");
    assert_eq!(stdout.trim(), "20");
    assert_eq!(code, 0);
}

#[test]
fn test_expr_mode_against_sheet() {
    let (stdout, _, code) = run_command(&["-", "-e", "=C1/4"], COST_SHEET);
    assert_eq!(stdout.trim(), "250");
    assert_eq!(code, 0);
}

#[test]
fn test_expr_mode_error() {
    let (_, stderr, code) = run_command(&["-e", "1/0"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("division by zero"));
}

#[test]
fn test_max_depth_flag() {
    let input = r#"[{}, {"1": "=B1+1", "2": "=C1+1", "3": "1"}]"#;
    let (stdout, _, code) = run_command(&["--max-depth", "1"], input);
    assert_eq!(code, 0);
    assert_eq!(
        json(&stdout),
        serde_json::json!([{}, {"1": "#ERROR", "2": "2", "3": "1"}])
    );
}

#[test]
fn test_invalid_json_fails() {
    let (_, stderr, code) = run_command(&[], "{not json");
    assert_eq!(code, 1);
    assert!(stderr.contains("Failed to parse stdin"));
}

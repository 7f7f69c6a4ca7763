//! End-to-end runs of the `multalpha` and `mkmodel` binaries

use multalpha::model::writer::{encode_model, write_model_file};
use multalpha::model::ModelDescription;
use multalpha::Model;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn multalpha() -> Command {
    Command::new(env!("CARGO_BIN_EXE_multalpha"))
}

fn non_commuting() -> Model {
    ModelDescription::new(
        2,
        vec![vec![
            vec![vec![2.0, 0.0], vec![0.0, 1.0]],
            vec![vec![1.0, 1.0], vec![0.0, 1.0]],
        ]],
    )
    .into_model()
    .unwrap()
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn model(&self, model: &Model) -> PathBuf {
        let path = self.dir.path().join("model.bin");
        write_model_file(&path, model).unwrap();
        path
    }

    fn file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

fn run(model: &Path, symbols: &Path) -> Output {
    multalpha().arg(model).arg(symbols).output().unwrap()
}

fn parse_result(output: &Output) -> f64 {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let line = stdout.trim_end();
    assert_eq!(stdout.lines().count(), 1, "stdout: {:?}", stdout);
    let decimals = line.split('.').nth(1).unwrap();
    assert_eq!(decimals.len(), 14, "line {:?}", line);
    line.parse().unwrap()
}

#[test]
fn test_prints_log_norm() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());
    let symbols = fx.file("seq.txt", b"12\n");

    let output = run(&model, &symbols);
    assert!(output.status.success());
    assert!((parse_result(&output) - 5f64.ln()).abs() < 1e-12);
}

#[test]
fn test_order_changes_result() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());
    let forward = run(&model, &fx.file("a.txt", b"12"));
    let reverse = run(&model, &fx.file("b.txt", b"21"));
    assert!((parse_result(&reverse) - 4f64.ln()).abs() < 1e-12);
    assert_ne!(forward.stdout, reverse.stdout);
}

#[test]
fn test_model_summary_goes_to_stderr() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());
    let output = run(&model, &fx.file("seq.txt", b"1"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Matrix data read:"));
    assert!(stderr.contains("2 symbols"));
    assert!(stderr.contains("1 block rows."));

    let quiet = multalpha()
        .arg(&model)
        .arg(fx.file("seq2.txt", b"1"))
        .arg("--quiet")
        .output()
        .unwrap();
    assert!(quiet.stderr.is_empty());
    assert_eq!(quiet.stdout, output.stdout);
}

#[test]
fn test_invalid_symbol_prints_no_number() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());
    let mut text = b"1212".repeat(1000);
    text.extend_from_slice(b"\n3\n");

    let output = run(&model, &fx.file("bad.txt", &text));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("symbol out of range"));
    assert!(stderr.contains("offset 4000"));
}

#[test]
fn test_truncated_model_fails() {
    let fx = Fixture::new();
    let mut bytes = encode_model(&non_commuting()).unwrap();
    bytes.truncate(bytes.len() - 3);
    let model = fx.file("short.bin", &bytes);

    let output = run(&model, &fx.file("seq.txt", b"12"));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed model"));
}

#[test]
fn test_missing_files_fail() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());

    let output = run(&model, &fx.dir.path().join("nope.txt"));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let output = run(&fx.dir.path().join("nope.bin"), &fx.file("seq.txt", b"1"));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_wrong_arity_fails() {
    let output = multalpha().arg("only-one").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("problem with input arguments"));

    let output = multalpha().args(["a", "b", "c"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_degenerate_chain_fails() {
    let fx = Fixture::new();
    let model = ModelDescription::new(1, vec![vec![vec![vec![0.0]]]])
        .into_model()
        .unwrap();
    let output = run(&fx.model(&model), &fx.file("seq.txt", b"11"));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("degenerate chain"));
}

#[test]
fn test_empty_symbol_file() {
    let fx = Fixture::new();
    let model = ModelDescription::new(1, vec![vec![vec![vec![1.0; 3]; 3]]])
        .into_model()
        .unwrap();
    let output = run(&fx.model(&model), &fx.file("empty.txt", b""));
    assert!(output.status.success());
    assert!((parse_result(&output) - 3f64.ln()).abs() < 1e-12);
}

#[test]
fn test_stdin_and_batch_size() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());
    let text = b"1221\n21\n\n112\n2\n";
    let reference = run(&model, &fx.file("seq.txt", text));

    let mut child = multalpha()
        .arg(&model)
        .arg("-")
        .args(["--lines-per-batch", "1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(text).unwrap();
    let piped = child.wait_with_output().unwrap();

    assert!(piped.status.success());
    assert_eq!(piped.stdout, reference.stdout);
}

#[test]
fn test_config_and_report() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());
    let config = fx.file("run.json", br#"{ "lines_per_batch": 64, "read_buffer_bytes": 16 }"#);
    let report = fx.dir.path().join("report.json");

    let output = multalpha()
        .arg(&model)
        .arg(fx.file("seq.txt", b"12"))
        .arg("--config")
        .arg(&config)
        .arg("--report")
        .arg(&report)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["outcome"]["symbols_consumed"], 2);
    let log_norm = json["outcome"]["log_norm"].as_f64().unwrap();
    assert!((log_norm - parse_result(&output)).abs() < 1e-13);
}

#[test]
fn test_bad_config_fails() {
    let fx = Fixture::new();
    let model = fx.model(&non_commuting());
    let output = multalpha()
        .arg(&model)
        .arg(fx.file("seq.txt", b"12"))
        .args(["--lines-per-batch", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("configuration error"));
}

#[test]
fn test_mkmodel_writes_loadable_file() {
    let fx = Fixture::new();
    let description = fx.file(
        "model.json",
        br#"{
            "symbol_count": 2,
            "shift_values": [0, 1],
            "simplex_height": 2,
            "delta": 0.1,
            "regularity": "pad_only",
            "block_rows": [[ [[2.0, 0.0], [0.0, 1.0]], [[1.0, 1.0], [0.0, 1.0]] ]]
        }"#,
    );
    let out = fx.dir.path().join("built.bin");

    let status = Command::new(env!("CARGO_BIN_EXE_mkmodel"))
        .arg(&description)
        .arg(&out)
        .arg("--verify")
        .arg("--quiet")
        .status()
        .unwrap();
    assert!(status.success());

    let output = run(&out, &fx.file("seq.txt", b"12"));
    assert!((parse_result(&output) - 5f64.ln()).abs() < 1e-12);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pad only"));
}

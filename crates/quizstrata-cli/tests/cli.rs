//! Runs the `quizstrata` binary against small corpora

use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn quizstrata() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_quizstrata"));
    command.env_remove("QUIZSTRATA_SOURCE");
    command.env_remove("QUIZSTRATA_OUTPUT_DIR");
    command.env_remove("RUST_LOG");
    command
}

#[test]
fn test_curates_jsonl_corpus() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("clues.jsonl");
    fs::write(
        &corpus,
        concat!(
            r#"{"category": "SCIENCE", "question": "There are 12 planets", "answer": "no", "value": "$400"}"#,
            "\n",
            r#"{"category": "LANGUAGES", "question": "Bonjour le monde", "answer": "hello world"}"#,
            "\n",
            r#"{"category": "MYTHS", "question": "This creature is called", "answer": "Zorblatt"}"#,
            "\n",
            r#"{"question": "", "answer": ""}"#,
            "\n",
        ),
    )
    .unwrap();
    let output = dir.path().join("out");

    let status = quizstrata()
        .arg(&corpus)
        .args(["--config", "/no/such/quizstrata.yaml"])
        .arg("--output-dir")
        .arg(&output)
        .args(["--threshold", "2", "--dump-frequencies"])
        .status()
        .unwrap();
    assert!(status.success());

    let summary: Value =
        serde_json::from_str(&fs::read_to_string(output.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["total_records"], 4);
    assert_eq!(summary["strata"]["NUMBERS"]["members"], 1);
    assert_eq!(summary["strata"]["NON_ENGLISH"]["members"], 1);

    let numbers = fs::read_to_string(output.join("number_phrases.jsonl")).unwrap();
    assert_eq!(numbers.lines().count(), 1);
    assert!(numbers.contains("\"value\":400"));

    assert!(output.join("frequencies.json").exists());
}

#[test]
fn test_missing_corpus_fails() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");

    let result = quizstrata()
        .arg(dir.path().join("missing.json"))
        .args(["--config", "/no/such/quizstrata.yaml"])
        .arg("--output-dir")
        .arg(&output)
        .output()
        .unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn test_zero_sample_size_fails_before_reading() {
    let result = quizstrata()
        .args(["/no/such/corpus.json", "--config", "/no/such/quizstrata.yaml", "-n", "0"])
        .output()
        .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("sample_size"));
}

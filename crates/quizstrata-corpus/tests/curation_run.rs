//! End-to-end curation runs over temporary corpora

use quizstrata_core::{Error, Record, Stratum};
use quizstrata_corpus::{
    CorpusLoader, CurationConfig, CurationSummary, Curator, FREQUENCIES_FILE, SUMMARY_FILE,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_array_corpus(dir: &Path, clues: &[Value]) -> std::path::PathBuf {
    let path = dir.join("JEOPARDY_QUESTIONS1.json");
    fs::write(&path, serde_json::to_string_pretty(&Value::Array(clues.to_vec())).unwrap()).unwrap();
    path
}

fn clue(question: &str, answer: &str) -> Value {
    json!({
        "category": "POTPOURRI",
        "air_date": "2004-12-31",
        "question": question,
        "value": "$200",
        "answer": answer,
        "round": "Jeopardy!",
        "show_number": "4680"
    })
}

fn config(output_dir: &Path) -> CurationConfig {
    CurationConfig {
        output_dir: output_dir.to_path_buf(),
        progress_interval: 2,
        ..Default::default()
    }
}

fn read_jsonl(path: &Path) -> Vec<Record> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_array_corpus_streams_normalized_records() {
    let dir = TempDir::new().unwrap();
    let path = write_array_corpus(
        dir.path(),
        &[
            clue("'This planet has 2 moons'", "Mars"),
            json!("not a clue"),
            json!({"question": " NA ", "answer": "Rome", "value": "$1,200"}),
        ],
    );

    let records = CorpusLoader::open(&path).unwrap().load_all().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 0);
    assert_eq!(records[0].value, Some(200));
    assert_eq!(records[0].category.as_deref(), Some("POTPOURRI"));
    assert_eq!(records[1].id, 2);
    assert_eq!(records[1].question, "");
    assert_eq!(records[1].value, Some(1200));
}

#[test]
fn test_sink_error_stops_the_pass() {
    let dir = TempDir::new().unwrap();
    let clues: Vec<Value> = (0..5).map(|i| clue(&format!("clue {}", i), "x")).collect();
    let path = write_array_corpus(dir.path(), &clues);

    let mut seen = 0;
    let err = CorpusLoader::open(&path)
        .unwrap()
        .for_each(|_| {
            seen += 1;
            if seen == 2 {
                Err(Error::internal("stop here"))
            } else {
                Ok(())
            }
        })
        .unwrap_err();

    assert_eq!(seen, 2);
    assert!(matches!(err, Error::Internal(ref msg) if msg == "stop here"));
}

#[test]
fn test_top_level_object_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corpus.json");
    fs::write(&path, r#"{"question": "not an array"}"#).unwrap();

    let err = CorpusLoader::open(&path).unwrap().load_all().unwrap_err();
    assert!(matches!(err, Error::Corpus(_)));
}

#[test]
fn test_samples_are_bounded_and_ordered() {
    let dir = TempDir::new().unwrap();
    let clues: Vec<Value> = (0..30)
        .map(|i| clue(&format!("'Count to {}'", i), "a number"))
        .collect();
    let path = write_array_corpus(dir.path(), &clues);
    let output = dir.path().join("out");

    let summary = Curator::with_heuristic_oracle(CurationConfig {
        sample_size: 5,
        ..config(&output)
    })
    .unwrap()
    .run(&path)
    .unwrap();

    let numbers = summary.stratum(Stratum::Numbers).unwrap();
    assert_eq!(numbers.members, 30);
    assert_eq!(numbers.sampled, 5);
    assert_eq!(numbers.percentage, 100.0);

    let written = read_jsonl(&output.join("number_phrases.jsonl"));
    assert_eq!(written.len(), 5);
    assert!(written.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[test]
fn test_same_seed_same_output() {
    let dir = TempDir::new().unwrap();
    let clues: Vec<Value> = (0..40)
        .map(|i| clue(&format!("'In {} this explorer reached Zanzibar'", 1800 + i), "Burton"))
        .collect();
    let path = write_array_corpus(dir.path(), &clues);

    let run = |name: &str| {
        let output = dir.path().join(name);
        Curator::with_heuristic_oracle(CurationConfig {
            sample_size: 7,
            ..config(&output)
        })
        .unwrap()
        .run(&path)
        .unwrap();
        output
    };
    let first = run("first");
    let second = run("second");

    for stratum in Stratum::ALL {
        let file = format!("{}.jsonl", stratum.file_stem());
        assert_eq!(
            fs::read_to_string(first.join(&file)).unwrap(),
            fs::read_to_string(second.join(&file)).unwrap()
        );
    }
}

#[test]
fn test_summary_and_frequency_dump() {
    let dir = TempDir::new().unwrap();
    let path = write_array_corpus(
        dir.path(),
        &[
            clue("'This city on the Seine'", "Paris"),
            clue("'The Louvre is in this city'", "Paris"),
            clue("'A creature called'", "Zorblatt"),
        ],
    );
    let output = dir.path().join("out");

    let summary = Curator::with_heuristic_oracle(CurationConfig {
        dump_frequencies: true,
        ..config(&output)
    })
    .unwrap()
    .run(&path)
    .unwrap();

    let on_disk: CurationSummary =
        serde_json::from_str(&fs::read_to_string(output.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(on_disk.total_records, 3);
    assert_eq!(on_disk.distinct_candidates, summary.distinct_candidates);

    let frequencies = fs::read_to_string(output.join(FREQUENCIES_FILE)).unwrap();
    let parsed: serde_json::Map<String, Value> = serde_json::from_str(&frequencies).unwrap();
    assert_eq!(parsed["paris"], 2);
    assert!(frequencies.find("\"paris\"").unwrap() < frequencies.find("\"zorblatt\"").unwrap());
}

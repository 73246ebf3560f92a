//! Streaming corpus loader
//!
//! Reads either a top-level JSON array of clue objects or newline-delimited
//! JSON. Elements are decoded one at a time and handed to a callback, so the
//! corpus is never held in memory. Each pass over the corpus re-reads the
//! file, and record ids are the element's position in the stream, which keeps
//! them stable across passes.

use chrono::NaiveDate;
use quizstrata_core::{Error, Record, Result};
use serde::de::{self, DeserializeSeed, SeqAccess, Visitor};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Strings treated as a missing value (compared case-insensitively, trimmed)
const NULL_LIKE: &[&str] = &["", "n/a", "na", "null", "none"];

const AIR_DATE_FORMAT: &str = "%Y-%m-%d";

/// On-disk layout of a corpus file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    /// `[ {...}, {...} ]`
    JsonArray,

    /// One object per line
    JsonLines,
}

impl CorpusFormat {
    /// Infer the format from the file extension (`.jsonl`/`.ndjson` are lines)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") => {
                Self::JsonLines
            }
            _ => Self::JsonArray,
        }
    }
}

/// Counts from one pass over the corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Records delivered to the callback
    pub records: u64,

    /// Elements dropped because they were not objects
    pub skipped: u64,
}

/// Streams normalized records from a corpus file
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    path: PathBuf,
    format: CorpusFormat,
}

impl CorpusLoader {
    /// Open a corpus, inferring its format from the extension
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::with_format(path, CorpusFormat::from_path(path))
    }

    /// Open a corpus with an explicit format
    pub fn with_format(path: impl AsRef<Path>, format: CorpusFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::corpus(format!(
                "corpus file not found: {}",
                path.display()
            )));
        }
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> CorpusFormat {
        self.format
    }

    /// Stream every record through `sink`.
    ///
    /// An error from `sink` stops the pass and is returned unchanged.
    /// Malformed input is a `Corpus` error.
    pub fn for_each<F>(&self, mut sink: F) -> Result<LoadStats>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let stats = match self.format {
            CorpusFormat::JsonArray => self.stream_array(reader, &mut sink)?,
            CorpusFormat::JsonLines => self.stream_lines(reader, &mut sink)?,
        };

        debug!(
            path = %self.path.display(),
            records = stats.records,
            skipped = stats.skipped,
            "Corpus pass complete"
        );
        Ok(stats)
    }

    /// Collect every record; for small corpora and tests
    pub fn load_all(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        self.for_each(|record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    fn stream_array<R, F>(&self, reader: R, sink: &mut F) -> Result<LoadStats>
    where
        R: std::io::Read,
        F: FnMut(Record) -> Result<()>,
    {
        let mut state = StreamState::default();
        let mut deserializer = serde_json::Deserializer::from_reader(reader);

        let outcome = RecordStream {
            sink,
            state: &mut state,
        }
        .deserialize(&mut deserializer)
        .and_then(|()| deserializer.end());

        if let Some(err) = state.aborted.take() {
            return Err(err);
        }
        outcome.map_err(|e| {
            Error::corpus(format!("malformed corpus {}: {}", self.path.display(), e))
        })?;

        Ok(state.stats)
    }

    fn stream_lines<R, F>(&self, reader: R, sink: &mut F) -> Result<LoadStats>
    where
        R: BufRead,
        F: FnMut(Record) -> Result<()>,
    {
        let mut state = StreamState::default();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line).map_err(|e| {
                Error::corpus(format!(
                    "malformed corpus {} at line {}: {}",
                    self.path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            if let Some(record) = state.accept(value) {
                sink(record)?;
            }
        }

        Ok(state.stats)
    }
}

#[derive(Default)]
struct StreamState {
    next_position: u64,
    stats: LoadStats,
    aborted: Option<Error>,
}

impl StreamState {
    /// Assign the next position; objects become records, anything else is skipped
    fn accept(&mut self, value: Value) -> Option<Record> {
        let position = self.next_position;
        self.next_position += 1;

        match value {
            Value::Object(fields) => {
                self.stats.records += 1;
                Some(normalize_record(position, &fields))
            }
            other => {
                self.stats.skipped += 1;
                warn!(
                    position,
                    kind = value_kind(&other),
                    "Skipping corpus element that is not an object"
                );
                None
            }
        }
    }
}

/// Drives the JSON array one element at a time
struct RecordStream<'a, F> {
    sink: &'a mut F,
    state: &'a mut StreamState,
}

impl<'de, 'a, F> DeserializeSeed<'de> for RecordStream<'a, F>
where
    F: FnMut(Record) -> Result<()>,
{
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, 'a, F> Visitor<'de> for RecordStream<'a, F>
where
    F: FnMut(Record) -> Result<()>,
{
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON array of clue objects")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(value) = seq.next_element::<Value>()? {
            if let Some(record) = self.state.accept(value) {
                if let Err(err) = (self.sink)(record) {
                    self.state.aborted = Some(err);
                    return Err(de::Error::custom("corpus pass aborted"));
                }
            }
        }
        Ok(())
    }
}

/// Build a record from a raw clue object
pub fn normalize_record(id: u64, fields: &Map<String, Value>) -> Record {
    Record {
        id,
        category: text_field(fields, "category"),
        air_date: text_field(fields, "air_date")
            .and_then(|raw| NaiveDate::parse_from_str(&raw, AIR_DATE_FORMAT).ok()),
        question: text_field(fields, "question").unwrap_or_default(),
        answer: text_field(fields, "answer").unwrap_or_default(),
        value: fields.get("value").and_then(dollar_value),
        round: text_field(fields, "round"),
        show_number: text_field(fields, "show_number"),
    }
}

/// Trimmed string form of a field, `None` when missing or null-like
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match fields.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!is_null_like(&text)).then_some(text)
}

fn is_null_like(text: &str) -> bool {
    NULL_LIKE.iter().any(|null| text.eq_ignore_ascii_case(null))
}

/// `"$1,000"` → 1000. Anything unparsable is absent.
fn dollar_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => {
            let trimmed = s.trim();
            if is_null_like(trimmed) {
                return None;
            }
            trimmed
                .chars()
                .filter(|c| *c != '$' && *c != ',')
                .collect::<String>()
                .trim()
                .parse()
                .ok()
        }
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_normalize_full_record() {
        let record = normalize_record(
            7,
            &object(json!({
                "category": " HISTORY ",
                "air_date": "2004-12-31",
                "question": "'For the last 8 years of his life, Galileo was under house arrest'",
                "value": "$1,000",
                "answer": "Copernicus",
                "round": "Jeopardy!",
                "show_number": "4680"
            })),
        );

        assert_eq!(record.id, 7);
        assert_eq!(record.category.as_deref(), Some("HISTORY"));
        assert_eq!(record.air_date, NaiveDate::from_ymd_opt(2004, 12, 31));
        assert_eq!(record.value, Some(1000));
        assert_eq!(record.answer, "Copernicus");
        assert_eq!(record.show_number.as_deref(), Some("4680"));
    }

    #[test]
    fn test_null_like_strings_become_absent() {
        let record = normalize_record(
            0,
            &object(json!({
                "category": "N/A",
                "question": "null",
                "answer": "  ",
                "value": "None",
                "round": null
            })),
        );

        assert_eq!(record.category, None);
        assert_eq!(record.question, "");
        assert_eq!(record.answer, "");
        assert_eq!(record.value, None);
        assert_eq!(record.round, None);
        assert!(record.is_blank());
    }

    #[test]
    fn test_dollar_values() {
        assert_eq!(dollar_value(&json!("$200")), Some(200));
        assert_eq!(dollar_value(&json!("$2,000")), Some(2000));
        assert_eq!(dollar_value(&json!(400)), Some(400));
        assert_eq!(dollar_value(&json!("four hundred")), None);
        assert_eq!(dollar_value(&json!(-5)), None);
        assert_eq!(dollar_value(&json!(null)), None);
    }

    #[test]
    fn test_numbers_in_text_fields_become_strings() {
        let record = normalize_record(0, &object(json!({"show_number": 4680, "answer": 1492})));
        assert_eq!(record.show_number.as_deref(), Some("4680"));
        assert_eq!(record.answer, "1492");
    }

    #[test]
    fn test_unparsable_air_date_is_absent() {
        let record = normalize_record(0, &object(json!({"air_date": "12/31/2004"})));
        assert_eq!(record.air_date, None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            CorpusFormat::from_path(Path::new("clues.jsonl")),
            CorpusFormat::JsonLines
        );
        assert_eq!(
            CorpusFormat::from_path(Path::new("clues.NDJSON")),
            CorpusFormat::JsonLines
        );
        assert_eq!(
            CorpusFormat::from_path(Path::new("JEOPARDY_QUESTIONS1.json")),
            CorpusFormat::JsonArray
        );
    }

    #[test]
    fn test_missing_file_is_corpus_error() {
        let err = CorpusLoader::open("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Corpus(_)));
    }
}

//! Numeric content detector

use crate::detector::{Detection, DetectionInput, DetectionMetadata, Detector};
use quizstrata_core::{Result, Stratum};
use regex::Regex;
use std::time::Instant;

const CARDINAL_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "thousand", "million", "billion", "trillion",
];

const ORDINAL_WORDS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
    "tenth", "eleventh", "twelfth", "thirteenth", "fourteenth", "fifteenth", "sixteenth",
    "seventeenth", "eighteenth", "nineteenth", "twentieth", "thirtieth", "fortieth",
    "fiftieth", "sixtieth", "seventieth", "eightieth", "ninetieth", "hundredth", "thousandth",
    "millionth", "billionth",
];

/// Kinds of numeric content, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Percentage,
    Decimal,
    Digits,
    Word,
}

impl NumberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Decimal => "decimal",
            Self::Digits => "digits",
            Self::Word => "word",
        }
    }
}

/// Detects digit runs, decimals, percentages, and spelled-out number words
pub struct NumberDetector {
    patterns: Vec<(NumberKind, Regex)>,
}

impl NumberDetector {
    /// Create a new number detector
    pub fn new() -> Result<Self> {
        let lexicon = CARDINAL_WORDS
            .iter()
            .chain(ORDINAL_WORDS)
            .copied()
            .collect::<Vec<_>>()
            .join("|");

        let sources = [
            (
                NumberKind::Percentage,
                r"(?i)[0-9]+(?:\.[0-9]+)?\s*(?:%|\bper\s?cent\b)".to_string(),
            ),
            (NumberKind::Decimal, r"[0-9]+\.[0-9]+".to_string()),
            (NumberKind::Digits, r"[0-9]+".to_string()),
            (NumberKind::Word, format!(r"(?i)\b(?:{})\b", lexicon)),
        ];

        let mut patterns = Vec::with_capacity(sources.len());
        for (kind, source) in sources {
            let regex = Regex::new(&source).map_err(|e| {
                quizstrata_core::Error::internal(format!(
                    "Failed to compile {} regex: {}",
                    kind.as_str(),
                    e
                ))
            })?;
            patterns.push((kind, regex));
        }

        Ok(Self { patterns })
    }

    /// True when the text contains any numeric content
    pub fn detect(&self, text: &str) -> bool {
        self.patterns.iter().any(|(_, regex)| regex.is_match(text))
    }

    /// Every kind present in the text, with the span of its first match
    pub fn matches(&self, text: &str) -> Vec<(NumberKind, (usize, usize))> {
        self.patterns
            .iter()
            .filter_map(|(kind, regex)| regex.find(text).map(|m| (*kind, (m.start(), m.end()))))
            .collect()
    }
}

impl Detector for NumberDetector {
    fn evaluate(&self, input: &DetectionInput<'_>) -> Detection {
        let start = Instant::now();

        let found = self.matches(input.text);
        let detection = if found.is_empty() {
            Detection::negative()
        } else {
            let mut metadata = DetectionMetadata::default();
            for (kind, span) in found {
                metadata.spans.push(span);
                metadata.push("number_kind", kind.as_str());
            }
            Detection::positive(metadata)
        };

        detection.with_latency(start.elapsed().as_micros() as u64)
    }

    fn name(&self) -> &str {
        "numbers"
    }

    fn stratum(&self) -> Stratum {
        Stratum::Numbers
    }
}

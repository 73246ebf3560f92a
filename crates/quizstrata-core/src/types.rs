//! Core types for quizstrata

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Separator placed between question and answer when they are analysed together
pub const FULL_TEXT_SEPARATOR: &str = "\n";

/// A single normalized corpus entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Ordinal position in the corpus stream (stable across passes)
    pub id: u64,

    /// Category label of the clue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Date the episode aired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,

    /// Clue text (empty when the source had none)
    pub question: String,

    /// Response text (empty when the source had none)
    pub answer: String,

    /// Dollar value of the clue
    pub value: Option<u32>,

    /// Round name ("Jeopardy!", "Double Jeopardy!", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,

    /// Show identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_number: Option<String>,
}

impl Record {
    /// Create a record with only the text fields populated
    pub fn new(id: u64, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            category: None,
            air_date: None,
            question: question.into(),
            answer: answer.into(),
            value: None,
            round: None,
            show_number: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the dollar value
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the air date
    pub fn with_air_date(mut self, air_date: NaiveDate) -> Self {
        self.air_date = Some(air_date);
        self
    }

    /// Question and answer joined into the unit of analysis.
    ///
    /// Empty parts are skipped, so a record with neither yields `""`.
    pub fn full_text(&self) -> String {
        let parts: Vec<&str> = [self.question.as_str(), self.answer.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        parts.join(FULL_TEXT_SEPARATOR)
    }

    /// True when neither question nor answer carries any text
    pub fn is_blank(&self) -> bool {
        self.question.trim().is_empty() && self.answer.trim().is_empty()
    }
}

/// One of the output categories a record can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stratum {
    /// Text contains numeric content
    Numbers,
    /// Text is (at least partly) not in the primary language
    NonEnglish,
    /// Text contains a proper noun that is rare across the corpus
    UnusualProperNoun,
}

impl Stratum {
    /// Every stratum, in output order
    pub const ALL: [Stratum; 3] = [
        Stratum::Numbers,
        Stratum::NonEnglish,
        Stratum::UnusualProperNoun,
    ];

    /// Label used in logs and the summary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numbers => "NUMBERS",
            Self::NonEnglish => "NON_ENGLISH",
            Self::UnusualProperNoun => "UNUSUAL_PROPER_NOUN",
        }
    }

    /// File stem of the JSONL output for this stratum
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Numbers => "number_phrases",
            Self::NonEnglish => "non_english_phrases",
            Self::UnusualProperNoun => "unusual_proper_nouns",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Numbers => 0b001,
            Self::NonEnglish => 0b010,
            Self::UnusualProperNoun => 0b100,
        }
    }
}

impl fmt::Display for Stratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stratum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NUMBERS" => Ok(Self::Numbers),
            "NON_ENGLISH" => Ok(Self::NonEnglish),
            "UNUSUAL_PROPER_NOUN" => Ok(Self::UnusualProperNoun),
            other => Err(format!("unknown stratum: {}", other)),
        }
    }
}

/// The strata a record was assigned to. Membership is independent per stratum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StratumSet(u8);

impl StratumSet {
    /// The empty assignment
    pub fn new() -> Self {
        Self(0)
    }

    /// Add a stratum to the set
    pub fn insert(&mut self, stratum: Stratum) {
        self.0 |= stratum.bit();
    }

    /// Check membership
    pub fn contains(&self, stratum: Stratum) -> bool {
        self.0 & stratum.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in `Stratum::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = Stratum> + '_ {
        Stratum::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<Stratum> for StratumSet {
    fn from_iter<I: IntoIterator<Item = Stratum>>(iter: I) -> Self {
        let mut set = Self::new();
        for stratum in iter {
            set.insert(stratum);
        }
        set
    }
}

impl Serialize for StratumSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

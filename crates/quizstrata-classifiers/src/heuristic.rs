//! Heuristic text oracle
//!
//! A dependency-light oracle so the pipeline runs without an NLP model.
//! It exploits structural signals only:
//! - Language: stopword profiles matched with Aho-Corasick, plus script
//!   detection for non-Latin alphabets
//! - POS: capitalization outside sentence-initial common words marks `PROPN`
//! - Entities: maximal runs of adjacent proper nouns, optionally bridged by
//!   connectors ("of", "de", "van", hyphens)
//!
//! Accuracy is best-effort. Swap in a model-backed [`TextOracle`] for
//! anything beyond triage.

use crate::oracle::{EntitySpan, LanguageGuess, TaggedToken, TextOracle, PROPN_TAG};
use aho_corasick::{AhoCorasick, MatchKind};
use quizstrata_core::{Error, Result};
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

const NUM_TAG: &str = "NUM";
const PUNCT_TAG: &str = "PUNCT";
const OTHER_TAG: &str = "X";

/// Stopword hits needed before a Latin-script guess is attempted
const MIN_LANGUAGE_EVIDENCE: usize = 2;

const LANGUAGE_PROFILES: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "of", "to", "in", "is", "was", "that", "this", "with", "for", "his",
            "her", "from", "which", "who", "were", "are", "has", "had", "not", "it", "by", "on",
            "at", "an", "as", "be", "its", "their", "they", "he", "she", "what", "these", "those",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "des", "du", "une", "et", "est", "dans", "pour", "que", "qui",
            "sur", "au", "aux", "ce", "cette", "pas", "ne", "avec", "je", "vous", "nous", "il",
            "elle", "sont", "mais", "ou", "où", "très", "bonjour", "merci", "monde", "oui",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "ein", "eine", "mit", "auf", "für", "den",
            "dem", "des", "sich", "auch", "ich", "sie", "es", "wir", "zu", "von", "im", "guten",
            "tag", "danke", "ja", "nein", "welt", "über",
        ],
    ),
    (
        "es",
        &[
            "el", "los", "las", "del", "y", "que", "es", "en", "por", "con", "para", "una", "un",
            "muy", "pero", "como", "más", "está", "hola", "gracias", "sí", "mundo", "señor",
            "de", "la",
        ],
    ),
    (
        "it",
        &[
            "il", "lo", "gli", "della", "che", "è", "e", "di", "per", "non", "una", "sono", "con",
            "del", "nel", "anche", "ciao", "grazie", "molto", "mondo", "in",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "as", "da", "do", "das", "dos", "não", "é", "em", "um", "uma", "com",
            "que", "para", "por", "obrigado", "olá", "mundo", "muito", "você",
        ],
    ),
    (
        "nl",
        &[
            "het", "een", "en", "van", "de", "is", "niet", "dat", "met", "voor", "op", "zijn",
            "ik", "je", "wij", "dank", "wereld", "in",
        ],
    ),
    (
        "la",
        &[
            "et", "est", "in", "non", "ad", "cum", "quod", "sed", "qui", "quae", "esse", "sunt",
            "ego", "nos", "vos", "ergo", "veni", "vidi", "vici", "carpe", "diem", "pro", "ab",
        ],
    ),
];

/// Non-Latin scripts mapped to their most likely language
const SCRIPTS: &[(&str, u32, u32)] = &[
    ("el", 0x0370, 0x03FF),
    ("ru", 0x0400, 0x04FF),
    ("he", 0x0590, 0x05FF),
    ("ar", 0x0600, 0x06FF),
    ("hi", 0x0900, 0x097F),
    ("th", 0x0E00, 0x0E7F),
    ("ja", 0x3040, 0x30FF),
    ("zh", 0x4E00, 0x9FFF),
    ("ko", 0xAC00, 0xD7AF),
];

/// Never proper nouns, even when capitalized
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "nor", "of", "in", "on", "at", "to", "for", "from",
    "by", "with", "as", "is", "was", "are", "were", "be", "been", "it", "its", "he", "she",
    "they", "we", "you", "i", "his", "her", "their", "our", "my", "your", "this", "that",
    "these", "those", "not", "no", "if", "so", "than", "then", "there", "here", "what", "which",
    "who", "whom", "whose", "when", "where", "why", "how",
];

/// Capitalized only because they open a sentence
const COMMON_STARTERS: &[&str] = &[
    "after", "before", "during", "while", "because", "although", "though", "since", "until",
    "once", "like", "unlike", "known", "named", "called", "famous", "born", "some", "many",
    "most", "all", "each", "every", "both", "one", "two", "three", "first", "last", "only",
    "also", "just", "even", "now", "today", "yesterday", "tomorrow", "according", "despite",
    "often", "usually", "perhaps", "yes", "please", "let", "do", "does", "did", "can", "could",
    "would", "should", "will", "may", "might", "must", "have", "has", "had", "seen", "meaning",
    "type", "term", "word", "name", "another", "other", "its", "over", "under", "about",
];

/// Lowercase words allowed inside an entity between two proper nouns
const CONNECTORS: &[&str] = &[
    "of", "de", "del", "della", "da", "du", "des", "la", "le", "van", "von", "der", "den", "y",
    "the", "and", "&",
];

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "sir", "dame", "lord", "lady", "king", "queen",
    "president", "senator", "general", "captain", "saint", "st", "pope", "emperor",
];

/// Abbreviated titles; they precede names but are not part of them
const TITLE_ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr"];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "co", "ltd", "llc", "plc", "company", "corporation", "university",
    "college", "institute", "foundation", "society", "association", "party", "bank", "group",
    "records", "airlines",
];

const LOCATION_HEADS: &[&str] = &[
    "mount", "mt", "lake", "river", "cape", "fort", "port", "isle", "gulf", "bay", "sea",
    "ocean", "desert", "island", "islands", "mountains", "valley", "city", "county",
];

/// A token produced by the segmenter
#[derive(Debug, Clone)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    tag: &'static str,
}

/// Structural-signal text oracle
pub struct HeuristicOracle {
    stopwords: AhoCorasick,
    stopword_languages: Vec<Vec<&'static str>>,
}

impl HeuristicOracle {
    /// Create a new heuristic oracle
    pub fn new() -> Result<Self> {
        // One pattern per distinct word, remembering every language that uses it
        let mut by_word: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
        for (language, words) in LANGUAGE_PROFILES {
            for word in *words {
                let languages = by_word.entry(*word).or_default();
                if !languages.contains(language) {
                    languages.push(*language);
                }
            }
        }

        let (patterns, stopword_languages): (Vec<_>, Vec<_>) = by_word.into_iter().unzip();

        let stopwords = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| Error::internal(format!("Failed to build stopword matcher: {}", e)))?;

        Ok(Self {
            stopwords,
            stopword_languages,
        })
    }

    fn script_language(text: &str) -> Option<LanguageGuess> {
        let mut letters = 0usize;
        let mut counts = [0usize; SCRIPTS.len()];
        for c in text.chars().filter(|c| c.is_alphabetic()) {
            letters += 1;
            let code = c as u32;
            if let Some(index) = SCRIPTS
                .iter()
                .position(|(_, lo, hi)| (*lo..=*hi).contains(&code))
            {
                counts[index] += 1;
            }
        }

        let (index, &top) = counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))?;
        if letters == 0 || top * 2 <= letters {
            return None;
        }
        Some(LanguageGuess::new(SCRIPTS[index].0, top as f32 / letters as f32))
    }

    fn stopword_language(&self, text: &str) -> Result<LanguageGuess> {
        let lowered = text.to_lowercase();
        let mut hits = vec![0usize; LANGUAGE_PROFILES.len()];
        let mut total = 0usize;

        for m in self.stopwords.find_iter(&lowered) {
            if !is_word_boundary(&lowered, m.start(), m.end()) {
                continue;
            }
            for language in &self.stopword_languages[m.pattern().as_usize()] {
                if let Some(index) = LANGUAGE_PROFILES.iter().position(|(l, _)| l == language) {
                    hits[index] += 1;
                    total += 1;
                }
            }
        }

        if total < MIN_LANGUAGE_EVIDENCE {
            return Err(Error::oracle(format!(
                "not enough evidence to identify language ({} stopword hits)",
                total
            )));
        }

        // Earlier profiles win ties
        let (index, &top) = hits
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
            .ok_or_else(|| Error::oracle("no language profiles"))?;

        Ok(LanguageGuess::new(
            LANGUAGE_PROFILES[index].0,
            top as f32 / total as f32,
        ))
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut sentence_start = true;

        for (start, segment) in text.split_word_bound_indices() {
            if segment.chars().all(char::is_whitespace) {
                if segment.contains('\n') {
                    sentence_start = true;
                }
                continue;
            }

            let tag = tag_segment(segment, sentence_start);
            tokens.push(Token {
                text: segment,
                start,
                end: start + segment.len(),
                tag,
            });

            if matches!(segment, "." | "!" | "?" | ":" | ";") {
                sentence_start = true;
            } else if tag != PUNCT_TAG {
                sentence_start = false;
            }
        }

        tokens
    }

    fn entity_label(tokens: &[Token<'_>], first: usize, last: usize) -> &'static str {
        let preceding = tokens[..first]
            .iter()
            .rev()
            .find(|t| t.text != ".")
            .map(|t| t.text.to_lowercase());
        if preceding.is_some_and(|p| HONORIFICS.contains(&p.as_str())) {
            return "PERSON";
        }

        let head = tokens[first].text.to_lowercase();
        let tail = tokens[last].text.to_lowercase();
        if ORG_SUFFIXES.contains(&tail.as_str()) {
            "ORG"
        } else if LOCATION_HEADS.contains(&head.as_str()) || LOCATION_HEADS.contains(&tail.as_str())
        {
            "LOC"
        } else {
            "MISC"
        }
    }
}

impl TextOracle for HeuristicOracle {
    fn detect_language(&self, text: &str) -> Result<LanguageGuess> {
        if text.trim().is_empty() {
            return Err(Error::oracle("cannot identify language of empty text"));
        }
        if let Some(guess) = Self::script_language(text) {
            return Ok(guess);
        }
        self.stopword_language(text)
    }

    fn extract_entities(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let tokens = self.tokenize(text);
        let mut entities = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            if tokens[i].tag != PROPN_TAG {
                i += 1;
                continue;
            }

            let mut last = i;
            loop {
                let next = last + 1;
                if next < tokens.len()
                    && tokens[next].tag == PROPN_TAG
                    && inline_gap(text, tokens[last].end, tokens[next].start)
                {
                    last = next;
                    continue;
                }

                if next + 1 < tokens.len() && tokens[next + 1].tag == PROPN_TAG {
                    let bridge = &tokens[next];
                    let bridged = if bridge.text == "-" {
                        bridge.start == tokens[last].end && bridge.end == tokens[next + 1].start
                    } else {
                        CONNECTORS.contains(&bridge.text.to_lowercase().as_str())
                            && inline_gap(text, tokens[last].end, bridge.start)
                            && inline_gap(text, bridge.end, tokens[next + 1].start)
                    };
                    if bridged {
                        last = next + 1;
                        continue;
                    }
                }

                break;
            }

            entities.push(EntitySpan::new(
                &text[tokens[i].start..tokens[last].end],
                Self::entity_label(&tokens, i, last),
            ));
            i = last + 1;
        }

        Ok(entities)
    }

    fn pos_tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
        Ok(self
            .tokenize(text)
            .into_iter()
            .map(|t| TaggedToken::new(t.text, t.tag))
            .collect())
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

fn tag_segment(segment: &str, sentence_start: bool) -> &'static str {
    let Some(first) = segment.chars().next() else {
        return PUNCT_TAG;
    };

    if first.is_ascii_digit() {
        return NUM_TAG;
    }
    if !segment.chars().any(char::is_alphanumeric) {
        return PUNCT_TAG;
    }
    if !first.is_uppercase() {
        return OTHER_TAG;
    }

    let lower = segment.to_lowercase();
    if FUNCTION_WORDS.contains(&lower.as_str())
        || TITLE_ABBREVIATIONS.contains(&lower.as_str())
        || (sentence_start && COMMON_STARTERS.contains(&lower.as_str()))
    {
        OTHER_TAG
    } else {
        PROPN_TAG
    }
}

/// Spaces or tabs only, on the same line
fn inline_gap(text: &str, from: usize, to: usize) -> bool {
    from < to && text[from..to].chars().all(|c| c == ' ' || c == '\t')
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

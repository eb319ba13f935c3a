use crate::error::IndexError;
use crate::Term;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_LETTERS: Regex = Regex::new(r"[^A-Za-z]+").expect("valid regex");
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","will","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Minimum candidate length for a word to become a term.
pub const DEFAULT_MIN_TERM_LEN: usize = 3;

/// Split text into lowercase alphabetic candidates.
///
/// Accented letters are folded to their base letter, every run of other
/// characters becomes a single space, and the result is split on that space.
/// Leading or trailing separators leave empty candidates at the boundaries;
/// the [`Analyzer`] never promotes an empty candidate to a term.
pub fn normalize(text: &str) -> Vec<String> {
    let folded = fold_accents(text);
    let spaced = NON_LETTERS.replace_all(&folded, " ");
    spaced.to_ascii_lowercase().split(' ').map(str::to_owned).collect()
}

fn fold_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Reduces a word to its stem.
pub trait Stem: Send + Sync {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str>;
}

impl Stem for Stemmer {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        Stemmer::stem(self, word)
    }
}

/// Identity stemmer: terms are the surface words.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStem;

impl Stem for NoStem {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(word)
    }
}

/// When stopword membership is checked relative to stemming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwordStage {
    /// Check the surface candidate, then stem.
    #[default]
    BeforeStem,
    /// Stem first, then check the stem.
    AfterStem,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Danish,
    Dutch,
    #[default]
    English,
    Finnish,
    French,
    German,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Spanish,
    Swedish,
    Turkish,
}

impl Language {
    fn algorithm(self) -> Algorithm {
        match self {
            Language::Danish => Algorithm::Danish,
            Language::Dutch => Algorithm::Dutch,
            Language::English => Algorithm::English,
            Language::Finnish => Algorithm::Finnish,
            Language::French => Algorithm::French,
            Language::German => Algorithm::German,
            Language::Hungarian => Algorithm::Hungarian,
            Language::Italian => Algorithm::Italian,
            Language::Norwegian => Algorithm::Norwegian,
            Language::Portuguese => Algorithm::Portuguese,
            Language::Romanian => Algorithm::Romanian,
            Language::Spanish => Algorithm::Spanish,
            Language::Swedish => Algorithm::Swedish,
            Language::Turkish => Algorithm::Turkish,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Language::Danish => "danish",
            Language::Dutch => "dutch",
            Language::English => "english",
            Language::Finnish => "finnish",
            Language::French => "french",
            Language::German => "german",
            Language::Hungarian => "hungarian",
            Language::Italian => "italian",
            Language::Norwegian => "norwegian",
            Language::Portuguese => "portuguese",
            Language::Romanian => "romanian",
            Language::Spanish => "spanish",
            Language::Swedish => "swedish",
            Language::Turkish => "turkish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = match s.trim().to_ascii_lowercase().as_str() {
            "danish" | "da" => Language::Danish,
            "dutch" | "nl" => Language::Dutch,
            "english" | "en" => Language::English,
            "finnish" | "fi" => Language::Finnish,
            "french" | "fr" => Language::French,
            "german" | "de" => Language::German,
            "hungarian" | "hu" => Language::Hungarian,
            "italian" | "it" => Language::Italian,
            "norwegian" | "no" => Language::Norwegian,
            "portuguese" | "pt" => Language::Portuguese,
            "romanian" | "ro" => Language::Romanian,
            "spanish" | "es" => Language::Spanish,
            "swedish" | "sv" => Language::Swedish,
            "turkish" | "tr" => Language::Turkish,
            _ => return Err(IndexError::UnknownLanguage(s.to_string())),
        };
        Ok(lang)
    }
}

/// Serializable description of an [`Analyzer`], stored next to an index so
/// queries are analyzed the same way the documents were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    pub language: Language,
    pub stem: bool,
    pub min_term_len: usize,
    pub stopword_stage: StopwordStage,
    /// Custom stopword list; `None` selects the built-in list for `language`.
    #[serde(default)]
    pub stopwords: Option<Vec<String>>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            language: Language::English,
            stem: true,
            min_term_len: DEFAULT_MIN_TERM_LEN,
            stopword_stage: StopwordStage::BeforeStem,
            stopwords: None,
        }
    }
}

/// Turns normalized candidates into terms: length filter, stopword filter,
/// stemming.
pub struct Analyzer {
    stopwords: HashSet<String>,
    stemmer: Box<dyn Stem>,
    min_term_len: usize,
    stopword_stage: StopwordStage,
}

impl Analyzer {
    pub fn new<I, S>(stopwords: I, stemmer: impl Stem + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            stemmer: Box::new(stemmer),
            min_term_len: DEFAULT_MIN_TERM_LEN,
            stopword_stage: StopwordStage::default(),
        }
    }

    /// English Snowball stemmer with the built-in English stopword list.
    pub fn english() -> Self {
        Self::from_settings(&AnalyzerSettings::default())
    }

    pub fn from_settings(settings: &AnalyzerSettings) -> Self {
        let stopwords: HashSet<String> = match &settings.stopwords {
            Some(words) => words.iter().map(|w| fold_accents(w.trim()).to_ascii_lowercase()).collect(),
            None if settings.language == Language::English => {
                ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect()
            }
            None => {
                tracing::warn!(language = %settings.language, "no built-in stopwords for language, none will be filtered");
                HashSet::new()
            }
        };
        let stemmer: Box<dyn Stem> = if settings.stem {
            Box::new(Stemmer::create(settings.language.algorithm()))
        } else {
            Box::new(NoStem)
        };
        Self {
            stopwords,
            stemmer,
            min_term_len: settings.min_term_len,
            stopword_stage: settings.stopword_stage,
        }
    }

    pub fn with_min_term_len(mut self, min_term_len: usize) -> Self {
        self.min_term_len = min_term_len;
        self
    }

    pub fn with_stopword_stage(mut self, stage: StopwordStage) -> Self {
        self.stopword_stage = stage;
        self
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Promote one candidate to a term, or `None` if it is filtered out.
    pub fn term(&self, candidate: &str) -> Option<Term> {
        if candidate.is_empty() || candidate.len() < self.min_term_len {
            return None;
        }
        match self.stopword_stage {
            StopwordStage::BeforeStem => {
                if self.is_stopword(candidate) {
                    return None;
                }
                Some(self.stemmer.stem(candidate).into_owned())
            }
            StopwordStage::AfterStem => {
                let stem = self.stemmer.stem(candidate);
                if self.is_stopword(&stem) {
                    return None;
                }
                Some(stem.into_owned())
            }
        }
    }

    /// Normalize and filter `text`, keeping duplicates in order.
    pub fn terms(&self, text: &str) -> Vec<Term> {
        normalize(text).iter().filter_map(|c| self.term(c)).collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("stopwords", &self.stopwords.len())
            .field("min_term_len", &self.min_term_len)
            .field("stopword_stage", &self.stopword_stage)
            .finish_non_exhaustive()
    }
}

//! TF-IDF full-text search over a folder of documents.
//!
//! Documents are analyzed into stemmed terms, counted per document, and
//! aggregated into a [`CorpusIndex`] which the [`ranker`] scores queries
//! against. [`persist`] and [`source`] are the filesystem boundaries.

pub mod error;
pub mod frequency;
pub mod index;
pub mod persist;
pub mod ranker;
pub mod source;
pub mod tokenizer;

pub use error::IndexError;
pub use frequency::{build_frequency_map, total_occurrences};
pub use index::{build_inverted_index, CorpusIndex, CorpusTable, FrequencyMap, InvertedIndex};
pub use ranker::{search, search_with, IdfMode, ScoredResult, SearchOptions};
pub use source::{read_folder, Document, SourceOptions};
pub use tokenizer::{normalize, Analyzer, AnalyzerSettings, Language, NoStem, Stem, StopwordStage};

/// A normalized, stemmed word used as an index key.
pub type Term = String;

/// Opaque name of a document, unique within one corpus.
pub type DocumentId = String;

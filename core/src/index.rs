use crate::error::IndexError;
use crate::frequency::build_frequency_map;
use crate::ranker::{self, ScoredResult};
use crate::source::Document;
use crate::tokenizer::{normalize, Analyzer};
use crate::{DocumentId, Term};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Term -> occurrences within one document. Absent terms are not stored.
pub type FrequencyMap = IndexMap<Term, u32>;

/// Document -> its frequency map, in insertion order.
pub type CorpusTable = IndexMap<DocumentId, FrequencyMap>;

/// Term -> documents containing it. The order of each entry is insertion
/// order and carries no ranking meaning.
pub type InvertedIndex = IndexMap<Term, Vec<DocumentId>>;

/// Derive the inverted index from a frequency table.
pub fn build_inverted_index(table: &CorpusTable) -> InvertedIndex {
    let mut inv = InvertedIndex::new();
    for (doc, freqs) in table {
        for term in freqs.keys() {
            let docs = inv.entry(term.clone()).or_default();
            // all terms of a document are visited together, only the tail can repeat it
            if docs.last() != Some(doc) {
                docs.push(doc.clone());
            }
        }
    }
    inv
}

/// Frequency table plus the inverted index derived from it.
///
/// Built once from a fixed document set and immutable afterwards. Any
/// deserialized value has been checked to be internally consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCorpusIndex")]
pub struct CorpusIndex {
    doc_freqs: CorpusTable,
    inv_index: InvertedIndex,
}

#[derive(Deserialize)]
struct RawCorpusIndex {
    doc_freqs: CorpusTable,
    inv_index: InvertedIndex,
}

impl TryFrom<RawCorpusIndex> for CorpusIndex {
    type Error = IndexError;

    fn try_from(raw: RawCorpusIndex) -> Result<Self, Self::Error> {
        validate(&raw.doc_freqs, &raw.inv_index)?;
        Ok(Self { doc_freqs: raw.doc_freqs, inv_index: raw.inv_index })
    }
}

impl CorpusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze every document and build the index.
    pub fn build<I>(analyzer: &Analyzer, documents: I) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let entries = documents.into_iter().map(|doc| {
            let freqs = build_frequency_map(analyzer, normalize(&doc.text));
            (doc.id, freqs)
        });
        Self::from_entries(entries)
    }

    /// Same result as [`CorpusIndex::build`], with the per-document analysis
    /// spread over the rayon pool.
    pub fn build_parallel(analyzer: &Analyzer, documents: Vec<Document>) -> Self {
        let entries: Vec<(DocumentId, FrequencyMap)> = documents
            .into_par_iter()
            .map(|doc| {
                let freqs = build_frequency_map(analyzer, normalize(&doc.text));
                (doc.id, freqs)
            })
            .collect();
        Self::from_entries(entries)
    }

    pub fn from_table(doc_freqs: CorpusTable) -> Self {
        let inv_index = build_inverted_index(&doc_freqs);
        tracing::debug!(num_docs = doc_freqs.len(), num_terms = inv_index.len(), "built inverted index");
        Self { doc_freqs, inv_index }
    }

    fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (DocumentId, FrequencyMap)>,
    {
        let mut table = CorpusTable::new();
        for (id, freqs) in entries {
            if table.contains_key(&id) {
                tracing::warn!(doc = %id, "duplicate document identifier, replacing earlier document");
            }
            table.insert(id, freqs);
        }
        Self::from_table(table)
    }

    pub fn doc_freqs(&self) -> &CorpusTable {
        &self.doc_freqs
    }

    pub fn inverted_index(&self) -> &InvertedIndex {
        &self.inv_index
    }

    pub fn num_docs(&self) -> usize {
        self.doc_freqs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.inv_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_freqs.is_empty()
    }

    pub fn frequencies(&self, doc: &str) -> Option<&FrequencyMap> {
        self.doc_freqs.get(doc)
    }

    /// Documents containing `term`; empty if the corpus never saw it.
    pub fn documents_with(&self, term: &str) -> &[DocumentId] {
        self.inv_index.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn search(&self, analyzer: &Analyzer, query: &str) -> Vec<ScoredResult> {
        ranker::search(self, analyzer, query)
    }
}

fn validate(table: &CorpusTable, inv: &InvertedIndex) -> Result<(), IndexError> {
    for (doc, freqs) in table {
        for (term, &count) in freqs {
            if count == 0 {
                return Err(IndexError::Malformed(format!("document {doc:?} has a zero count for {term:?}")));
            }
            if term.is_empty() || !term.bytes().all(|b| b.is_ascii_lowercase()) {
                return Err(IndexError::Malformed(format!("document {doc:?} has invalid term {term:?}")));
            }
        }
    }

    let derived = build_inverted_index(table);
    if derived.len() != inv.len() {
        return Err(IndexError::Malformed(format!(
            "inverted index has {} terms, frequency table implies {}",
            inv.len(),
            derived.len()
        )));
    }
    for (term, docs) in inv {
        let expected = derived
            .get(term)
            .ok_or_else(|| IndexError::Malformed(format!("term {term:?} does not occur in any document")))?;
        let listed: HashSet<&DocumentId> = docs.iter().collect();
        if listed.len() != docs.len() {
            return Err(IndexError::Malformed(format!("term {term:?} lists a document twice")));
        }
        if docs.len() != expected.len() || !expected.iter().all(|d| listed.contains(d)) {
            return Err(IndexError::Malformed(format!("documents for {term:?} disagree with the frequency table")));
        }
    }
    Ok(())
}

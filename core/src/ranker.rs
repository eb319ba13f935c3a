//! TF-IDF ranking of documents against a free-text query.
//!
//! For every document `D` and query term `t`:
//!
//! - `tf(t, D)` = count of `t` in `D` / sum of all counts in `D`
//! - `idf(t)` = `ln(N / df(t))` where `df(t)` is the number of documents
//!   containing `t`, or 0 when the corpus never saw `t`
//!
//! A document's score is the sum of `tf * idf` over the query terms,
//! duplicates included. Documents scoring 0 are left out.

use crate::frequency::total_occurrences;
use crate::index::CorpusIndex;
use crate::tokenizer::Analyzer;
use crate::DocumentId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub doc: DocumentId,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfMode {
    /// `ln(N / df)`
    #[default]
    Standard,
    /// `ln(1 + N / df)`; terms present in every document still count.
    Smoothed,
}

impl IdfMode {
    fn idf(self, num_docs: usize, doc_freq: usize) -> f64 {
        if doc_freq == 0 || num_docs == 0 {
            return 0.0;
        }
        let ratio = num_docs as f64 / doc_freq as f64;
        match self {
            IdfMode::Standard => ratio.ln(),
            IdfMode::Smoothed => (1.0 + ratio).ln(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub idf: IdfMode,
    /// Keep only the best `limit` results.
    pub limit: Option<usize>,
}

/// Rank every document of `index` against `query`, best first.
///
/// Ties are broken by document identifier, ascending.
pub fn search(index: &CorpusIndex, analyzer: &Analyzer, query: &str) -> Vec<ScoredResult> {
    search_with(index, analyzer, query, &SearchOptions::default())
}

pub fn search_with(index: &CorpusIndex, analyzer: &Analyzer, query: &str, opts: &SearchOptions) -> Vec<ScoredResult> {
    let terms = analyzer.terms(query);
    let n = index.num_docs();
    if terms.is_empty() || n == 0 {
        return Vec::new();
    }

    let weighted: Vec<(&str, f64)> = terms
        .iter()
        .map(|t| (t.as_str(), opts.idf.idf(n, index.documents_with(t).len())))
        .collect();

    let mut results: Vec<ScoredResult> = index
        .doc_freqs()
        .iter()
        .filter_map(|(doc, freqs)| {
            let total = total_occurrences(freqs);
            if total == 0 {
                return None;
            }
            let score: f64 = weighted
                .iter()
                .map(|(term, idf)| {
                    let count = freqs.get(*term).copied().unwrap_or(0);
                    (f64::from(count) / total as f64) * idf
                })
                .sum();
            (score > 0.0).then(|| ScoredResult { doc: doc.clone(), score })
        })
        .collect();

    results.sort_by(by_score_desc);
    if let Some(limit) = opts.limit {
        results.truncate(limit);
    }
    tracing::debug!(query, terms = terms.len(), hits = results.len(), "ranked query");
    results
}

fn by_score_desc(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.doc.cmp(&b.doc))
}

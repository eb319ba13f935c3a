use crate::index::FrequencyMap;
use crate::tokenizer::Analyzer;

/// Count the terms of one document's candidate stream.
///
/// Candidates the analyzer rejects are skipped; the returned map holds only
/// terms with a count of at least one, in first-occurrence order.
pub fn build_frequency_map<I, S>(analyzer: &Analyzer, tokens: I) -> FrequencyMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter_map(|candidate| analyzer.term(candidate.as_ref()))
        .fold(FrequencyMap::new(), |mut acc, term| {
            *acc.entry(term).or_insert(0) += 1;
            acc
        })
}

/// Sum of all term occurrences in a document's map.
pub fn total_occurrences(map: &FrequencyMap) -> u64 {
    map.values().map(|&c| u64::from(c)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{normalize, NoStem};

    fn plain() -> Analyzer {
        Analyzer::new(["the", "on", "and"], NoStem)
    }

    #[test]
    fn counts_in_first_occurrence_order() {
        let map = build_frequency_map(&plain(), normalize("the cat sat on the mat, the cat"));
        let entries: Vec<(&str, u32)> = map.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        assert_eq!(entries, vec![("cat", 2), ("sat", 1), ("mat", 1)]);
        assert_eq!(total_occurrences(&map), 4);
    }

    #[test]
    fn empty_stream_gives_empty_map() {
        let map = build_frequency_map(&plain(), Vec::<String>::new());
        assert!(map.is_empty());
        assert_eq!(total_occurrences(&map), 0);
    }

    #[test]
    fn stemmed_variants_share_a_count() {
        let map = build_frequency_map(&Analyzer::english(), normalize("connect connected connecting"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("connect"), Some(&3));
    }
}

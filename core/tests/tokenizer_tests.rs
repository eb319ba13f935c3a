use docsearch_core::tokenizer::{normalize, Analyzer};

#[test]
fn it_normalizes_and_stems() {
    let words = Analyzer::english().terms("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // Accent folding: café -> cafe
    assert!(words.contains(&"cafe".to_string()));
}

#[test]
fn it_filters_stopwords_and_short_words() {
    let words = Analyzer::english().terms("The quick brown fox and the lazy dog is up");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(!words.contains(&"is".to_string()));
    assert!(!words.contains(&"up".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn it_keeps_query_duplicates_in_order() {
    let words = Analyzer::english().terms("table placebo table");
    assert_eq!(words.len(), 3);
    assert_eq!(words[0], words[2]);
}

#[test]
fn renormalizing_normalized_text_is_stable() {
    for raw in ["Hello, World! 123 again", "x-ray: CAT--dog", "plain words only"] {
        let once = normalize(raw);
        let joined = once.iter().filter(|t| !t.is_empty()).cloned().collect::<Vec<_>>().join(" ");
        let twice = normalize(&joined);
        assert_eq!(twice.join(" "), joined);
        assert_eq!(normalize(&twice.join(" ")), twice);
    }
}

#[test]
fn digits_and_punctuation_only_yield_no_terms() {
    assert!(Analyzer::english().terms("123 456 -- !!").is_empty());
    assert!(Analyzer::english().terms("").is_empty());
}

use docsearch_core::persist::{load_index, save_index, save_meta, load_meta, store, load, Format, IndexPaths, MetaFile};
use docsearch_core::{read_folder, Analyzer, AnalyzerSettings, CorpusIndex, IndexError, SourceOptions, search};
use std::fs;
use tempfile::tempdir;

fn corpus() -> CorpusIndex {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "Placebo controlled trials of a new table design").unwrap();
    fs::write(dir.path().join("b.html"), "<html><body><p>Table tennis tables</p></body></html>").unwrap();
    let docs = read_folder(dir.path(), &SourceOptions::default()).unwrap();
    CorpusIndex::build(&Analyzer::english(), docs)
}

#[test]
fn stored_index_answers_queries_like_the_original() {
    let index = corpus();
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    for format in [Format::Bincode, Format::Json] {
        let meta = MetaFile::describe(&index, format, AnalyzerSettings::default(), "2024-01-01T00:00:00Z".into());
        save_index(&paths, &index, &meta).unwrap();
        let (loaded, meta) = load_index(&paths).unwrap();
        assert_eq!(meta.format, format);
        assert_eq!(meta.num_docs, 2);
        assert_eq!(loaded, index);
        let analyzer = Analyzer::from_settings(&meta.analyzer);
        assert_eq!(search(&loaded, &analyzer, "table placebo"), search(&index, &analyzer, "table placebo"));
    }
}

#[test]
fn code_like_blob_is_rejected_as_data() {
    let blob = br#"({doc_freqs: (function(){ return {} })(), inv_index: {}})"#;
    assert!(matches!(load(blob, Format::Json), Err(IndexError::Malformed(_))));
    assert!(matches!(load(blob, Format::Bincode), Err(IndexError::Malformed(_))));
}

#[test]
fn mismatched_inverted_index_is_rejected() {
    let blob = br#"{"doc_freqs":{"a":{"tabl":1},"b":{"tabl":2}},"inv_index":{"tabl":["a"]}}"#;
    assert!(matches!(load(blob, Format::Json), Err(IndexError::Malformed(_))));
}

#[test]
fn document_count_must_match_meta() {
    let index = corpus();
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let mut meta = MetaFile::describe(&index, Format::Json, AnalyzerSettings::default(), String::new());
    save_index(&paths, &index, &meta).unwrap();
    meta.num_docs = 7;
    save_meta(&paths, &meta).unwrap();
    assert!(matches!(load_index(&paths), Err(IndexError::Malformed(_))));
}

#[test]
fn unsupported_version_is_reported() {
    let index = corpus();
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let mut meta = MetaFile::describe(&index, Format::Bincode, AnalyzerSettings::default(), String::new());
    meta.version = 99;
    save_index(&paths, &index, &meta).unwrap();
    assert!(matches!(load_meta(&paths), Err(IndexError::UnsupportedVersion { found: 99, .. })));
}

#[test]
fn empty_index_round_trips() {
    let index = CorpusIndex::new();
    let back = load(&store(&index, Format::Bincode).unwrap(), Format::Bincode).unwrap();
    assert!(back.is_empty());
}

#[test]
fn index_without_length_filter_round_trips() {
    let settings = AnalyzerSettings { min_term_len: 0, ..AnalyzerSettings::default() };
    for analyzer in [Analyzer::from_settings(&settings), Analyzer::english().with_min_term_len(0)] {
        let index = CorpusIndex::build(&analyzer, vec![docsearch_core::Document::new("d", " cat! ox ")]);
        let keys: Vec<&str> = index.frequencies("d").unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["cat", "ox"]);
        for format in [Format::Bincode, Format::Json] {
            assert_eq!(load(&store(&index, format).unwrap(), format).unwrap(), index);
        }
    }
}

#[test]
fn meta_counts_beyond_u32_are_kept() {
    let index = corpus();
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let mut meta = MetaFile::describe(&index, Format::Bincode, AnalyzerSettings::default(), String::new());
    save_index(&paths, &index, &meta).unwrap();
    meta.num_docs = u64::from(u32::MAX) + 2;
    save_meta(&paths, &meta).unwrap();
    assert_eq!(load_meta(&paths).unwrap().num_docs, u64::from(u32::MAX) + 2);
    assert!(matches!(load_index(&paths), Err(IndexError::Malformed(_))));
}

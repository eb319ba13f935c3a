use criterion::{criterion_group, criterion_main, Criterion};
use docsearch_core::tokenizer::{normalize, Analyzer};
use docsearch_core::{search, CorpusIndex, Document};

fn bench_tokenize(c: &mut Criterion) {
    let text = include_str!("../../README.md");
    let analyzer = Analyzer::english();
    c.bench_function("normalize_readme", |b| b.iter(|| normalize(text)));
    c.bench_function("analyze_readme", |b| b.iter(|| analyzer.terms(text)));
}

fn bench_search(c: &mut Criterion) {
    let text = include_str!("../../README.md");
    let analyzer = Analyzer::english();
    let docs: Vec<Document> = text
        .split("\n\n")
        .enumerate()
        .map(|(i, para)| Document::new(format!("para{i}"), para))
        .collect();
    c.bench_function("build_readme_paragraphs", |b| b.iter(|| CorpusIndex::build(&analyzer, docs.clone())));
    let index = CorpusIndex::build_parallel(&analyzer, docs);
    c.bench_function("search_readme_paragraphs", |b| b.iter(|| search(&index, &analyzer, "inverted index ranking query")));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);

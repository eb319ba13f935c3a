use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docsearch_core::persist::{load_index, save_index, Format, IndexPaths, MetaFile};
use docsearch_core::{
    read_folder, search_with, Analyzer, AnalyzerSettings, CorpusIndex, Document, IdfMode, Language, ScoredResult,
    SearchOptions, SourceOptions, StopwordStage,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a TF-IDF index over a folder of documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a folder and store the index
    Build {
        #[command(flatten)]
        source: SourceArgs,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Blob encoding: bincode or json
        #[arg(long, default_value = "bincode")]
        format: Format,
        #[command(flatten)]
        analyzer: AnalyzerArgs,
        /// Analyze documents on all cores
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Query a stored index
    Search {
        /// Index directory written by `build`
        #[arg(long)]
        index: PathBuf,
        query: String,
        #[command(flatten)]
        rank: RankArgs,
    },
    /// Index a folder in memory and query it without storing anything
    Query {
        #[command(flatten)]
        source: SourceArgs,
        query: String,
        #[command(flatten)]
        analyzer: AnalyzerArgs,
        #[command(flatten)]
        rank: RankArgs,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Folder of documents to index
    #[arg(long)]
    input: PathBuf,
    /// Descend into subfolders
    #[arg(long, default_value_t = false)]
    recursive: bool,
    /// Only index files with these extensions (comma-separated)
    #[arg(long, value_delimiter = ',')]
    ext: Option<Vec<String>>,
}

impl SourceArgs {
    fn options(&self) -> SourceOptions {
        SourceOptions { recursive: self.recursive, extensions: self.ext.clone() }
    }
}

#[derive(Args)]
struct AnalyzerArgs {
    /// Stemming language
    #[arg(long, default_value = "english")]
    language: Language,
    /// Index surface words instead of stems
    #[arg(long, default_value_t = false)]
    no_stem: bool,
    /// File with one stopword per line, replacing the built-in list
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Check stopwords against the stem instead of the surface word
    #[arg(long, default_value_t = false)]
    stopwords_after_stem: bool,
    /// Shortest word that can become a term
    #[arg(long, default_value_t = 3)]
    min_term_len: usize,
}

impl AnalyzerArgs {
    fn settings(&self) -> Result<AnalyzerSettings> {
        let stopwords = match &self.stopwords {
            Some(path) => Some(read_stopwords(path)?),
            None => None,
        };
        Ok(AnalyzerSettings {
            language: self.language,
            stem: !self.no_stem,
            min_term_len: self.min_term_len,
            stopword_stage: if self.stopwords_after_stem { StopwordStage::AfterStem } else { StopwordStage::BeforeStem },
            stopwords,
        })
    }
}

#[derive(Args)]
struct RankArgs {
    /// Maximum number of results
    #[arg(short, long)]
    k: Option<usize>,
    /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
    #[arg(long, default_value_t = false)]
    smoothed_idf: bool,
    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl RankArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            idf: if self.smoothed_idf { IdfMode::Smoothed } else { IdfMode::Standard },
            limit: self.k,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { source, output, format, analyzer, parallel } => {
            let settings = analyzer.settings()?;
            build_index(&source.input, &source.options(), &output, format, settings, parallel)?;
        }
        Commands::Search { index, query, rank } => {
            let results = search_index(&index, &query, &rank.options())?;
            print_results(&results, rank.json)?;
        }
        Commands::Query { source, query, analyzer, rank, parallel } => {
            let analyzer = Analyzer::from_settings(&analyzer.settings()?);
            let docs = read_folder(&source.input, &source.options())?;
            let corpus = index_documents(&analyzer, docs, parallel);
            let t0 = Instant::now();
            let results = search_with(&corpus, &analyzer, &query, &rank.options());
            tracing::info!(hits = results.len(), took_ms = t0.elapsed().as_millis() as u64, "search complete");
            print_results(&results, rank.json)?;
        }
    }
    Ok(())
}

fn build_index(
    input: &Path,
    source: &SourceOptions,
    output: &Path,
    format: Format,
    settings: AnalyzerSettings,
    parallel: bool,
) -> Result<CorpusIndex> {
    let analyzer = Analyzer::from_settings(&settings);
    let docs = read_folder(input, source).with_context(|| format!("reading documents from {}", input.display()))?;
    let corpus = index_documents(&analyzer, docs, parallel);

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = MetaFile::describe(&corpus, format, settings, created_at);
    let paths = IndexPaths::new(output);
    save_index(&paths, &corpus, &meta).with_context(|| format!("writing index to {}", output.display()))?;

    tracing::info!(output = %output.display(), "index build complete");
    Ok(corpus)
}

fn index_documents(analyzer: &Analyzer, docs: Vec<Document>, parallel: bool) -> CorpusIndex {
    let t0 = Instant::now();
    let corpus = if parallel { CorpusIndex::build_parallel(analyzer, docs) } else { CorpusIndex::build(analyzer, docs) };
    tracing::info!(
        num_docs = corpus.num_docs(),
        num_terms = corpus.num_terms(),
        took_ms = t0.elapsed().as_millis() as u64,
        "indexed documents"
    );
    corpus
}

fn search_index(index_dir: &Path, query: &str, opts: &SearchOptions) -> Result<Vec<ScoredResult>> {
    let paths = IndexPaths::new(index_dir);
    let (corpus, meta) = load_index(&paths).with_context(|| format!("loading index from {}", index_dir.display()))?;
    let analyzer = Analyzer::from_settings(&meta.analyzer);
    let t0 = Instant::now();
    let results = search_with(&corpus, &analyzer, query, opts);
    tracing::info!(hits = results.len(), took_ms = t0.elapsed().as_millis() as u64, "search complete");
    Ok(results)
}

fn print_results(results: &[ScoredResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }
    if results.is_empty() {
        eprintln!("no results");
    }
    for r in results {
        println!("{:.6}\t{}", r.score, r.doc);
    }
    Ok(())
}

fn read_stopwords(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading stopwords from {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_docs(dir: &Path) {
        fs::write(dir.join("doc1.txt"), "the cat sat on the mat").unwrap();
        fs::write(dir.join("doc2.txt"), "the dog sat on the log").unwrap();
        fs::write(dir.join("doc3.html"), "<h1>Cats</h1><p>A cat and another cat</p>").unwrap();
    }

    #[test]
    fn built_index_can_be_searched() {
        let docs = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_docs(docs.path());

        let built = build_index(docs.path(), &SourceOptions::default(), out.path(), Format::Json, AnalyzerSettings::default(), true)
            .unwrap();
        assert_eq!(built.num_docs(), 3);
        assert!(out.path().join("index.json").exists());
        assert!(out.path().join("meta.json").exists());

        let results = search_index(out.path(), "cat", &SearchOptions::default()).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.doc.as_str()).collect();
        assert_eq!(ids, vec!["doc3.html", "doc1.txt"]);

        let limited = search_index(out.path(), "cat", &SearchOptions { limit: Some(1), ..Default::default() }).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn stored_settings_drive_query_analysis() {
        let docs = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(docs.path().join("a.txt"), "running runners").unwrap();
        fs::write(docs.path().join("b.txt"), "walking walkers").unwrap();

        let settings = AnalyzerSettings { stem: false, ..AnalyzerSettings::default() };
        build_index(docs.path(), &SourceOptions::default(), out.path(), Format::Bincode, settings, false).unwrap();

        assert!(search_index(out.path(), "run", &SearchOptions::default()).unwrap().is_empty());
        let hits = search_index(out.path(), "running", &SearchOptions::default()).unwrap();
        assert_eq!(hits[0].doc, "a.txt");
    }

    #[test]
    fn missing_input_fails_without_writing() {
        let out = tempdir().unwrap();
        let missing = out.path().join("missing");
        let target = out.path().join("index");
        let err = build_index(&missing, &SourceOptions::default(), &target, Format::Bincode, AnalyzerSettings::default(), false);
        assert!(err.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn stopword_file_ignores_comments_and_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "# custom\nfoo\n\n  bar  \n").unwrap();
        assert_eq!(read_stopwords(&path).unwrap(), vec!["foo", "bar"]);
    }
}

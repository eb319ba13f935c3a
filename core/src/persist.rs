use crate::error::{IndexError, Result};
use crate::index::CorpusIndex;
use crate::tokenizer::AnalyzerSettings;
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const INDEX_VERSION: u32 = 1;

/// Upper bound on a bincode blob; larger length prefixes are rejected
/// instead of allocated.
pub const MAX_BLOB_BYTES: u64 = 1 << 30;

/// Encoding of the index blob. Both are plain data formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Bincode,
    Json,
}

impl Format {
    fn file_name(self) -> &'static str {
        match self {
            Format::Bincode => "index.bin",
            Format::Json => "index.json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Bincode => f.write_str("bincode"),
            Format::Json => f.write_str("json"),
        }
    }
}

impl FromStr for Format {
    type Err = IndexError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bincode" | "bin" => Ok(Format::Bincode),
            "json" => Ok(Format::Json),
            _ => Err(IndexError::UnknownFormat(s.to_string())),
        }
    }
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_BLOB_BYTES)
}

/// Serialize an index to an opaque blob.
pub fn store(index: &CorpusIndex, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Bincode => bincode_options().serialize(index).map_err(|e| IndexError::Encode(e.to_string())),
        Format::Json => serde_json::to_vec(index).map_err(|e| IndexError::Encode(e.to_string())),
    }
}

/// Decode a blob produced by [`store`]. Inconsistent or truncated input is
/// rejected as [`IndexError::Malformed`].
pub fn load(blob: &[u8], format: Format) -> Result<CorpusIndex> {
    match format {
        Format::Bincode => bincode_options().deserialize(blob).map_err(|e| IndexError::Malformed(e.to_string())),
        Format::Json => serde_json::from_slice(blob).map_err(|e| IndexError::Malformed(e.to_string())),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub num_docs: u64,
    pub num_terms: u64,
    pub created_at: String,
    pub format: Format,
    pub analyzer: AnalyzerSettings,
}

impl MetaFile {
    pub fn describe(index: &CorpusIndex, format: Format, analyzer: AnalyzerSettings, created_at: String) -> Self {
        Self {
            version: INDEX_VERSION,
            num_docs: index.num_docs() as u64,
            num_terms: index.num_terms() as u64,
            created_at,
            format,
            analyzer,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn blob(&self, format: Format) -> PathBuf { self.root.join(format.file_name()) }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta).map_err(|e| IndexError::Encode(e.to_string()))?;
    fs::write(paths.meta(), json)?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let buf = fs::read(paths.meta())?;
    let meta: MetaFile = serde_json::from_slice(&buf).map_err(|e| IndexError::Malformed(format!("meta.json: {e}")))?;
    if meta.version != INDEX_VERSION {
        return Err(IndexError::UnsupportedVersion { found: meta.version, expected: INDEX_VERSION });
    }
    Ok(meta)
}

/// Write the index blob and its `meta.json` sidecar.
pub fn save_index(paths: &IndexPaths, index: &CorpusIndex, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let blob = store(index, meta.format)?;
    fs::write(paths.blob(meta.format), &blob)?;
    save_meta(paths, meta)?;
    tracing::info!(root = %paths.root.display(), bytes = blob.len(), format = %meta.format, "stored index");
    Ok(())
}

/// Load an index written by [`save_index`] together with its metadata.
pub fn load_index(paths: &IndexPaths) -> Result<(CorpusIndex, MetaFile)> {
    let meta = load_meta(paths)?;
    let blob = fs::read(paths.blob(meta.format))?;
    let index = load(&blob, meta.format)?;
    if index.num_docs() as u64 != meta.num_docs {
        return Err(IndexError::Malformed(format!(
            "meta.json records {} documents, index holds {}",
            meta.num_docs,
            index.num_docs()
        )));
    }
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "loaded index");
    Ok((index, meta))
}

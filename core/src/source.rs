use crate::error::{IndexError, Result};
use crate::DocumentId;
use scraper::Html;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKUP_EXTENSIONS: &[&str] = &["html", "htm", "xhtml", "xml"];

/// Plain text of one document, ready for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Descend into subfolders.
    pub recursive: bool,
    /// Only read files with one of these extensions (case-insensitive).
    pub extensions: Option<Vec<String>>,
}

/// Read every file of a folder as a [`Document`], ordered by path.
///
/// Identifiers are paths relative to `root` with `/` separators. Any
/// enumeration or read failure fails the whole call.
pub fn read_folder(root: impl AsRef<Path>, opts: &SourceOptions) -> Result<Vec<Document>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(IndexError::SourceUnavailable {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let max_depth = if opts.recursive { usize::MAX } else { 1 };
    let mut docs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.map_err(|e| IndexError::SourceUnavailable {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            source: io::Error::from(e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = extension(path);
        if let Some(allowed) = &opts.extensions {
            if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
                continue;
            }
        }

        let bytes = fs::read(path).map_err(|source| IndexError::SourceUnavailable { path: path.to_path_buf(), source })?;
        let raw = String::from_utf8_lossy(&bytes);
        let text = if MARKUP_EXTENSIONS.contains(&ext.as_str()) { strip_markup(&raw) } else { raw.into_owned() };
        docs.push(Document { id: document_id(root, path), text });
    }
    tracing::info!(root = %root.display(), num_docs = docs.len(), "read document folder");
    Ok(docs)
}

/// Text content of an HTML/XML document, without `script` and `style` bodies.
pub fn strip_markup(markup: &str) -> String {
    let html = Html::parse_document(markup);
    let mut out = String::with_capacity(markup.len() / 2);
    for node in html.root_element().descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| matches!(e.name(), "script" | "style")))
            .unwrap_or(false);
        if hidden {
            continue;
        }
        out.push_str(text);
        out.push(' ');
    }
    out
}

fn extension(path: &Path) -> String {
    path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase).unwrap_or_default()
}

fn document_id(root: &Path, path: &Path) -> DocumentId {
    let rel: PathBuf = path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf());
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The document source could not enumerate or read its inputs.
    #[error("document source unavailable at {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted index blob does not have the corpus index shape.
    #[error("malformed persisted index: {0}")]
    Malformed(String),

    #[error("unsupported index version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("unknown stemming language: {0}")]
    UnknownLanguage(String),

    #[error("unknown index format: {0}")]
    UnknownFormat(String),

    #[error("failed to encode index: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;

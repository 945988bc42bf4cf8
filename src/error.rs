use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of posts, found {found}")]
    NotAnArray { found: &'static str },

    #[error("post #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("post #{index} has an unparseable author date: {value}")]
    UnparseableDate { index: usize, value: String },

    #[error("invalid handle pattern in {source_name} at line {line}: {message}")]
    InvalidPattern {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

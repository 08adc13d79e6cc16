use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a file's bytes into text. Fatal for that file only.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no candidate encoding decodes the input (tried {tried}) and the lossy fallback is disabled")]
    NoCandidate { tried: String },
}

/// Required columns are absent from a record set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required column(s) {missing:?}; columns present: {present:?}")]
pub struct SchemaError {
    pub missing: Vec<String>,
    pub present: Vec<String>,
}

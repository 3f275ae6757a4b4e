//! Error types for extraction runs.
//!
//! Only conditions that make the whole run meaningless are errors. Corpus
//! irregularities (missing note files, unmatched ids, orphan markers) are
//! logged and skipped by the pipeline instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Missing required file: {0}")]
    MissingFile(String),

    #[error("Unsupported input: {0}")]
    UnsupportedSource(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;

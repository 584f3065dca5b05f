use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resume JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("font error: {0}")]
    Font(String),

    #[error("invalid page range: {0}")]
    InvalidPageRange(String),

    #[error("page selection {selection} matches none of the {page_count} pages")]
    EmptySelection { selection: String, page_count: usize },

    #[error("resume {0} not found")]
    ResumeNotFound(i64),

    #[error("invalid resume id {0}: ids are positive, 0 means unsaved")]
    InvalidResumeId(i64),

    #[error("export cancelled")]
    Cancelled,

    #[error("text completion failed: {0}")]
    Completion(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn font(path: &std::path::Path, detail: impl fmt::Display) -> Self {
        Error::Font(format!("{}: {}", path.display(), detail))
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovdeltaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}: {content:?}")]
    Parse {
        line: usize,
        content: String,
        message: String,
    },

    #[error("Empty coverage profile: missing mode line")]
    EmptyProfile,

    #[error("Profile for file {0:?} already exists")]
    DuplicateFile(String),

    #[error("Invalid changed files list: {0}")]
    ChangedFiles(#[source] serde_json::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Unsupported format: {0:?}. Supported: markdown, json")]
    UnsupportedFormat(String),

    #[error("Invalid exclude pattern: {0}")]
    InvalidFilter(#[from] regex::Error),
}

impl CovdeltaError {
    pub(crate) fn parse(line: usize, content: &str, message: impl Into<String>) -> Self {
        CovdeltaError::Parse {
            line,
            content: content.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CovdeltaError>;

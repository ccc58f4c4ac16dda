use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering or parsing model files.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file is not a well-formed XML document with a root element.
    #[error("root element name not found in {}: {reason}", path.display())]
    RootNameNotFound { path: PathBuf, reason: String },
    /// The model file could not be parsed into models.
    #[error("malformed model file {}: {reason}", path.display())]
    MalformedModel { path: PathBuf, reason: String },
    /// Duplicate models were found for a parser without merge semantics.
    #[error("merge not implemented by parser '{parser}' for duplicate model '{id}'")]
    MergeNotSupported { parser: String, id: String },
    /// Walking the model base directory failed.
    #[error("candidate discovery failed: {0}")]
    Discovery(String),
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Core(#[from] metagen_core::Error),
}

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

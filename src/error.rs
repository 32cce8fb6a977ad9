//! Error types for the extraction pipeline.
//!
//! Only structural failures are errors. Anything the parser merely could not
//! interpret is reported through [`crate::anomaly::Anomalies`] or a
//! [`crate::segment::SegmentWarning`] instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A document named in the configuration is not in the corpus directory.
    #[error("document {name:?} not found in corpus")]
    MissingDocument { name: String },

    /// A document has no recognizable chronology (or key) section.
    #[error("no {section} found in {document}")]
    MissingSection { document: String, section: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_section(document: impl Into<String>, section: impl Into<String>) -> Self {
        Self::MissingSection {
            document: document.into(),
            section: section.into(),
        }
    }
}

//! Error types for bookxml.
//!
//! Only unrecoverable conditions live here. Layout ambiguities never
//! become errors; they are carried as [`Diagnostic`](crate::model::Diagnostic)s.

use std::io;
use thiserror::Error;

/// Result type alias for bookxml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that abort a whole-document run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading inputs or writing outputs.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version header could not be understood.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The layout bundle from the extraction front-end is missing or malformed.
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error while serializing the document tree.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error came from reading the input document.
    ///
    /// The CLI maps these to a non-zero exit status; everything else
    /// the pipeline can hit is reported as a diagnostic instead.
    pub fn is_ingestion(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::UnknownFormat | Error::UnsupportedVersion(_) | Error::Ingest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format: not a valid PDF");

        let err = Error::Ingest("page 3: bbox has NaN".to_string());
        assert_eq!(err.to_string(), "Ingestion error: page 3: bbox has NaN");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_ingestion());
    }

    #[test]
    fn test_render_is_not_ingestion() {
        assert!(!Error::Render("bad".into()).is_ingestion());
        assert!(!Error::InvalidConfig("x".into()).is_ingestion());
    }
}

//! Errors returned by the conversion library.
//!
//! Every variant is terminal for the invocation. The binary prints the
//! `Display` text after an `Error:` prefix and exits with status 1.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input path did not exist when the conversion started.
    #[error("PDF file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("URL inputs are disabled: {input}")]
    UrlInput { input: String },

    /// The extractor binary could not be spawned because it is not on PATH.
    #[error("extraction utility '{program}' not found; install poppler-utils or set extractor.program")]
    ExtractorNotFound { program: String },

    /// The extractor ran but exited non-zero.
    #[error("'{program}' failed ({status}): {stderr}")]
    ExtractionFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("'{program}' exceeded timeout of {secs}s")]
    ExtractionTimedOut { program: String, secs: u64 },

    #[error("invalid postprocess pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ConvertError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

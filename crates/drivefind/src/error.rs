use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during discovery or transfer planning.
///
/// Note the three-tier policy: discovery is best-effort and never returns an
/// error (probe failures only lower scores), planning is strict and returns
/// one of the variants below, and per-file copy failures are reported inside
/// [`CopyOutcome`](crate::transfer::CopyOutcome) rather than as an `Err`.
#[derive(Debug, Error)]
pub enum Error {
    /// The running OS has no discovery strategy
    #[error("no iCloud discovery strategy for platform: {0}")]
    UnsupportedPlatform(String),

    /// Source path for a copy operation does not exist
    #[error("source path not found: {0}")]
    SourceNotFound(PathBuf),

    /// Discovery and filtering produced no usable destination
    #[error("no valid target path found (is iCloud Drive set up on this machine?)")]
    NoValidTargetPath,

    /// Source is a directory but recursive copying was not requested
    #[error("source is a directory, pass recursive to copy it: {0}")]
    RecursionRequired(PathBuf),

    /// The plan matched no files
    #[error("no files to copy")]
    NoFilesToCopy,

    /// File pattern could not be compiled
    #[error("invalid file pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The glob as given by the caller
        pattern: String,
        /// Compiler diagnostic
        reason: String,
    },

    /// IO error while walking the source tree
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error came from transfer planning, meaning the
    /// operation stopped before any file was touched.
    pub fn is_plan_error(&self) -> bool {
        matches!(
            self,
            Error::SourceNotFound(_)
                | Error::NoValidTargetPath
                | Error::RecursionRequired(_)
                | Error::NoFilesToCopy
                | Error::InvalidPattern { .. }
        )
    }
}

/// Result type for drivefind operations
pub type Result<T> = std::result::Result<T, Error>;

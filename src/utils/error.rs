//! Error types for the collection tools.
//!
//! Provides a hierarchy of error types using `thiserror`. Per-item failures
//! ([`ServiceError`], [`FormatError`], per-item IO) are isolated by the batch
//! loops; only [`DescriberError::CorruptState`] and directory-creation failures
//! abort a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Validation errors for user-supplied paths and settings.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Path-related validation error
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// File path errors.
#[derive(Error, Debug)]
pub enum PathError {
    /// Path does not exist
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotDirectory(PathBuf),
    /// File has no extension or an extension outside the accepted set
    #[error("Unsupported file type: {0}")]
    UnsupportedType(PathBuf),
}

/// Failure of a call to the captioning service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Connection refused, reset, DNS failure and similar
    #[error("Network error: {0}")]
    Network(String),
    /// The request exceeded its timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// The service answered with a non-2xx status
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The service answered 2xx but the payload carried no description
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The image could not be read from disk
    #[error("Cannot read image {path}: {reason}")]
    ImageRead { path: PathBuf, reason: String },
}

impl ServiceError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::InvalidResponse(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::ImageRead { .. } => false,
        }
    }
}

/// A detected table could not be rendered into a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Table has no header row")]
    MissingHeader,
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },
    #[error("Table formatting failed: {0}")]
    Other(String),
}

/// A PDF could not be opened or its pages could not be read.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF library unavailable: {0}")]
    Library(String),
    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("Failed to read page {page} of {path}: {reason}")]
    Page { path: PathBuf, page: usize, reason: String },
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Main error type for the image describer.
#[derive(Error, Debug)]
pub enum DescriberError {
    /// Root folder or configuration validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Captioning call failed after all retries
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// A persisted state file exists but cannot be parsed
    #[error("Corrupt state file {path} (line {line}): {reason}. Repair or delete it and rerun.")]
    CorruptState {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A detected table failed to render
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// File or directory IO failed
    #[error("IO error at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience result type for describer operations.
pub type DescriberResult<T> = Result<T, DescriberError>;

// Helper methods for error creation
impl DescriberError {
    pub fn io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn corrupt_state(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptState {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors that must stop the whole session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CorruptState { .. } | Self::Validation(_) | Self::Config(_))
    }
}

// Helper methods for validation error creation
impl ValidationError {
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotFound(path.into()))
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotDirectory(path.into()))
    }

    pub fn unsupported_type(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::UnsupportedType(path.into()))
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

// Convert PathError to DescriberError
impl From<PathError> for DescriberError {
    fn from(err: PathError) -> Self {
        Self::Validation(ValidationError::Path(err))
    }
}

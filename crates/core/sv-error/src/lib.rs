//! Error types and classification for sieve.
//!
//! This crate provides:
//! - [`SvError`] - Top-level error enum for all run failures
//! - Domain-specific errors ([`SourceError`], [`DecodeError`], [`RecordError`], [`SinkError`])
//! - [`ErrorKind`] mapping every error onto the run's failure taxonomy
//! - [`ProcessingStage`] naming where in a run an error surfaced

use thiserror::Error;

/// Top-level error type for sieve.
#[derive(Error, Debug)]
pub enum SvError {
    /// The source could not be opened or fetched
    #[error("Source unavailable: {0}")]
    Source(#[from] SourceError),

    /// The source byte stream broke mid-run
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A single input line could not be turned into an output record
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// The output destination could not be written or closed
    #[error("Sink write error: {0}")]
    Sink(#[from] SinkError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while resolving and opening a source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Object or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials or filesystem permissions refused access
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The source identifier could not be parsed
    #[error("Invalid source location: {0}")]
    InvalidLocation(String),

    /// The object storage client failed
    #[error("Object store error: {0}")]
    ObjectStore(String),

    /// Local I/O error while opening
    #[error("I/O error: {0}")]
    Io(String),
}

/// Stream-level failures after the source was opened.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The gzip stream is malformed or truncated
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// The underlying byte stream failed
    #[error("I/O error reading source: {0}")]
    Io(String),
}

/// Per-line failures. These never abort a run on their own.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The line is not a valid JSON value
    #[error("Line {line}: invalid JSON: {message}")]
    Parse { line: u64, message: String },

    /// The filter function failed for this record
    #[error("Line {line}: filter failed: {message}")]
    Filter { line: u64, message: String },
}

/// Failures on the output side of a run.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The destination could not be opened
    #[error("Failed to open {path}: {message}")]
    Open { path: String, message: String },

    /// A record could not be serialized
    #[error("Failed to serialize record: {0}")]
    Serialize(String),

    /// Writing to the destination failed
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    /// Flushing, finalizing or closing the destination failed
    #[error("Failed to close {path}: {message}")]
    Close { path: String, message: String },

    /// The sink stopped accepting records before the pipeline finished
    #[error("Sink closed before all records were delivered")]
    Disconnected,
}

impl RecordError {
    /// Returns the 1-based input line number the error refers to.
    pub fn line(&self) -> u64 {
        match self {
            Self::Parse { line, .. } | Self::Filter { line, .. } => *line,
        }
    }
}

/// The failure taxonomy a caller sees for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source cannot be opened or fetched
    SourceUnavailable,

    /// Malformed compressed stream or systemic I/O break
    DecodeError,

    /// Per-line parse or filter failure
    RecordError,

    /// Destination cannot be written or closed
    SinkWriteError,

    /// Invalid options or filter configuration
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceUnavailable => write!(f, "SourceUnavailable"),
            Self::DecodeError => write!(f, "DecodeError"),
            Self::RecordError => write!(f, "RecordError"),
            Self::SinkWriteError => write!(f, "SinkWriteError"),
            Self::Config => write!(f, "Config"),
        }
    }
}

impl SvError {
    /// Returns the taxonomy kind of this error.
    ///
    /// [`SvError::Other`] is what record filters return when they fail on a
    /// single record, so it is a [`ErrorKind::RecordError`]. The pipeline
    /// counts those per line and never ends a run with one.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Source(_) => ErrorKind::SourceUnavailable,
            Self::Decode(_) => ErrorKind::DecodeError,
            Self::Record(_) | Self::Other(_) => ErrorKind::RecordError,
            Self::Sink(_) => ErrorKind::SinkWriteError,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Pipeline stage where an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Resolving and opening the source
    SourceOpen,

    /// Reading (and optionally decompressing) source bytes into lines
    LineRead,

    /// Parsing a line as JSON
    Parse,

    /// Running the filter function
    Filter,

    /// Serializing, compressing or writing a record
    SinkWrite,

    /// Finalizing and closing the destination
    SinkClose,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceOpen => write!(f, "SourceOpen"),
            Self::LineRead => write!(f, "LineRead"),
            Self::Parse => write!(f, "Parse"),
            Self::Filter => write!(f, "Filter"),
            Self::SinkWrite => write!(f, "SinkWrite"),
            Self::SinkClose => write!(f, "SinkClose"),
        }
    }
}

/// Result type alias using SvError.
pub type Result<T> = std::result::Result<T, SvError>;

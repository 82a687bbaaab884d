//! Layered error definitions
//!
//! One error type crosses every component boundary. Each variant maps onto a
//! stable [`ErrorKind`] so callers can branch on the category without string
//! matching.

use std::fmt;

use thiserror::Error;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller misuse: not opened, missing required value
    InvalidArgument,
    /// Expected end of a sequence (replay EOF); not a failure
    OutOfRange,
    /// Missing file or directory
    NotFound,
    /// Read / write / create failure
    Io,
    /// Well-formed path, malformed payload
    CorruptData,
    /// Malformed text input
    Parse,
    /// Optional operation not implemented
    Unsupported,
    /// Invariant violation
    Internal,
}

impl ErrorKind {
    /// Stable snake_case name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::OutOfRange => "out_of_range",
            Self::NotFound => "not_found",
            Self::Io => "io_error",
            Self::CorruptData => "corrupt_data",
            Self::Parse => "parse_error",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type
#[derive(Debug, Error)]
pub enum NodeError {
    /// Caller misuse
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// End of sequence
    #[error("out of range: {message}")]
    OutOfRange { message: String },

    /// Missing file or directory
    #[error("not found: {message}")]
    NotFound { message: String },

    /// IO failure
    #[error("io error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Malformed payload
    #[error("corrupt data: {message}")]
    CorruptData { message: String },

    /// Malformed text input
    #[error("parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Not implemented
    #[error("unsupported: {message}")]
    Unsupported { message: String },

    /// Invariant violation
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl NodeError {
    /// Create invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create out of range (EOF) error
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::OutOfRange {
            message: message.into(),
        }
    }

    /// Create not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create IO error without an underlying cause
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create IO error wrapping a `std::io::Error`
    pub fn io_with(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {source}", message.into()),
            source: Some(source),
        }
    }

    /// Classify a `std::io::Error` with context (missing path -> not found)
    pub fn from_io(context: impl Into<String>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(format!("{}: {source}", context.into()))
        } else {
            Self::io_with(context, source)
        }
    }

    /// Create corrupt data error
    pub fn corrupt_data(message: impl Into<String>) -> Self {
        Self::CorruptData {
            message: message.into(),
        }
    }

    /// Create parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } | Self::ConfigValidation { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::Io,
            Self::CorruptData { .. } => ErrorKind::CorruptData,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// True for the end-of-sequence status
    pub fn is_eof(&self) -> bool {
        self.kind() == ErrorKind::OutOfRange
    }
}

impl From<std::io::Error> for NodeError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(e.to_string())
        } else {
            Self::Io {
                message: e.to_string(),
                source: Some(e),
            }
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, NodeError>;

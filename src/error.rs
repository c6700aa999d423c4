//! Error types and handling infrastructure for statusline.
//!
//! The renderer treats its sink as a plain byte stream, so most failures are I/O errors
//! surfaced from the underlying writer. `thiserror` describes the library errors; the
//! binary wraps them in `anyhow` for context.

use thiserror::Error;

/// The main error type for statusline operations.
#[derive(Error, Debug)]
pub enum StatusError {
    /// Writing to or flushing the output sink failed
    #[error("Output operation failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Subscribing to terminal resize notifications failed
    #[error("Resize notification setup failed: {message}")]
    Signal {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file or value
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for statusline operations.
pub type Result<T> = std::result::Result<T, StatusError>;

impl StatusError {
    /// Create an Io error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a Signal error from a failed subscription
    pub fn signal(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Signal {
            message: message.into(),
            source,
        }
    }

    /// Create a Config error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

// Automatic conversion from io::Error to StatusError
impl From<std::io::Error> for StatusError {
    fn from(err: std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::BrokenPipe => "Output closed",
            std::io::ErrorKind::WriteZero => "Output accepted no bytes",
            _ => "IO operation failed",
        };
        Self::Io {
            message: message.to_string(),
            source: err,
        }
    }
}

// The `std::io::Write` implementations on the renderers must hand back an io::Error.
impl From<StatusError> for std::io::Error {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::Io { source, .. } | StatusError::Signal { source, .. } => source,
            other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
        }
    }
}

//! Error types for multipart parsing.

use std::fmt;
use thiserror::Error;

/// Result type alias using MultipartError.
pub type Result<T> = std::result::Result<T, MultipartError>;

/// Line and column of the offending token, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Main error type for multipart parsing.
#[derive(Error, Debug)]
pub enum MultipartError {
    /// The JSON shape does not follow the multipart schema.
    #[error("Malformed multipart structure: {message}{}", fmt_position(.position))]
    MalformedStructure {
        message: String,
        position: Option<SourcePosition>,
    },

    /// An `apply` payload could not be decoded.
    #[error("Failed to deserialize apply payload: {0}")]
    PayloadDeserializationFailed(#[source] serde_json::Error),

    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_position(position: &Option<SourcePosition>) -> String {
    match position {
        Some(pos) => format!(" at {}", pos),
        None => String::new(),
    }
}

impl MultipartError {
    /// Classify a `serde_json` error raised outside of any payload.
    pub(crate) fn from_structure(err: serde_json::Error) -> Self {
        if err.is_io() {
            return MultipartError::Io(err.into());
        }
        // serde_json reports line 0 when it has no position for the error.
        let position = (err.line() > 0).then(|| SourcePosition {
            line: err.line(),
            column: err.column(),
        });
        let rendered = err.to_string();
        let message = match position {
            Some(_) => rendered
                .rsplit_once(" at line ")
                .map(|(message, _)| message.to_string())
                .unwrap_or(rendered),
            None => rendered,
        };
        MultipartError::MalformedStructure { message, position }
    }

    /// Position of the offending token, if the error carries one.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            MultipartError::MalformedStructure { position, .. } => *position,
            MultipartError::PayloadDeserializationFailed(err) if err.line() > 0 => {
                Some(SourcePosition {
                    line: err.line(),
                    column: err.column(),
                })
            }
            _ => None,
        }
    }
}

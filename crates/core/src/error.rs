//! Error types for contentstream.

use thiserror::Error;

/// Primary error type for content stream operations.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Operation invoked in an invalid mode (e.g. nested `BT`).
    #[error("state error: {0}")]
    State(String),

    /// Wrong operand arity, type or range, or an unencodable glyph.
    #[error("argument error: {0}")]
    Argument(String),

    /// A named filter in a decode chain failed.
    #[error("filter {name} (index {index}) failed: {message}")]
    Filter {
        index: usize,
        name: String,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid token at position {pos}: {msg}")]
    TokenError { pos: usize, msg: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("stream length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch { declared: i64, actual: usize },

    #[error("decode error: {0}")]
    DecodeError(String),
}

impl PdfError {
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;

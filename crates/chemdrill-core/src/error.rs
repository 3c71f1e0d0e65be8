//! Parse-boundary error types.
//!
//! Malformed rows and entities produce typed errors at the parse boundary
//! instead of being silently dropped, so the loader can classify them as
//! validation failures without string matching.

use thiserror::Error;

/// Errors produced while parsing a remote payload into question records.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A delimited-text row has too few fields or an empty required field.
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A pre-structured entity failed schema validation.
    #[error("malformed entity at index {index}: {reason}")]
    MalformedEntity { index: usize, reason: String },
}

impl ParseError {
    /// 1-based position of the offending row or entity.
    pub fn position(&self) -> usize {
        match self {
            ParseError::MalformedRow { line, .. } => *line,
            ParseError::MalformedEntity { index, .. } => index + 1,
        }
    }
}

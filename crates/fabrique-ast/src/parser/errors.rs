//! Parser error types.

use fabrique_core::{FabError, SourceRange};
use thiserror::Error;

use super::TokPos;
use crate::tokenizer::TokError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("{0}")]
    Tokenize(#[from] TokError),

    /// The grammar could not continue; `expected` lists the token set that
    /// would have been accepted.
    #[error("unexpected token at {location}")]
    Parse { location: TokPos, expected: String },
}

impl ParserError {
    pub(crate) fn from_parse(err: peg::error::ParseError<TokPos>) -> Self {
        ParserError::Parse {
            location: err.location,
            expected: err.expected.to_string(),
        }
    }

    /// Where the problem is.
    pub fn span(&self) -> SourceRange {
        match self {
            ParserError::Tokenize(err) => err.span().clone(),
            ParserError::Parse { location, .. } => location.span.clone(),
        }
    }

    /// Byte offset and length of the offending text, for snippet rendering.
    pub fn offset_len(&self) -> (usize, usize) {
        match self {
            ParserError::Tokenize(err) => (err.offset(), 1),
            ParserError::Parse { location, .. } => (location.offset, location.len.max(1)),
        }
    }

    /// Convert into the unified error type, carrying the expected-token set
    /// as the diagnostic detail.
    pub fn to_fab_error(&self) -> FabError {
        match self {
            ParserError::Tokenize(err) => err.clone().into(),
            ParserError::Parse { expected, .. } => FabError::syntax_with_detail(
                self.to_string(),
                self.span(),
                format!("expected {expected}"),
            ),
        }
    }
}

//! Errors produced while reading, tokenizing and parsing a source file.
//!
//! Every error is fatal for the file being processed: the parser does not
//! resynchronize, it hands the first failure back to the caller.
use std::io;
use thiserror::Error as ThisError;

use super::lexer::TokenKind;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unable to read source: {0}")]
    Io(#[from] io::Error),

    #[error("token index {index} is out of range ({len} tokens available)")]
    OutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

#[derive(Clone, PartialEq, Eq, Debug, ThisError)]
pub enum SyntaxError {
    #[error("unmatched `[` at token {index} on line {line}: expected `]`, found {found}")]
    UnmatchedBracket { index: usize, line: usize, found: TokenKind },

    #[error("unexpected {found} at token {index} on line {line}: expected an operand")]
    UnexpectedToken { index: usize, line: usize, found: TokenKind },
}

/// Discriminant of an [`Error`], for callers that only care about the category.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    Io,
    OutOfRange,
    UnmatchedBracket,
    UnexpectedToken,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::OutOfRange { .. } => ErrorKind::OutOfRange,
            Error::Syntax(SyntaxError::UnmatchedBracket { .. }) => ErrorKind::UnmatchedBracket,
            Error::Syntax(SyntaxError::UnexpectedToken { .. }) => ErrorKind::UnexpectedToken,
        }
    }

    /// Index of the offending token. I/O errors happen before any token
    /// exists and have none.
    pub fn token_index(&self) -> Option<usize> {
        match self {
            Error::Io(_) => None,
            Error::OutOfRange { index, .. } => Some(*index),
            Error::Syntax(SyntaxError::UnmatchedBracket { index, .. })
            | Error::Syntax(SyntaxError::UnexpectedToken { index, .. }) => Some(*index),
        }
    }
}

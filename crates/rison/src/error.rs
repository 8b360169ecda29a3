//! Rison decoder error type.

use thiserror::Error;

/// Broad classification of a [`RisonError`].
///
/// Callers that want to recover from bad input (a hand-edited link, say)
/// should match on the kind rather than on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RisonErrorKind {
    /// The text is not valid Rison.
    MalformedInput,
    /// The text may be valid but breaches a decoder limit.
    LimitExceeded,
}

/// Error returned by the Rison decoder. Offsets are byte positions in the
/// decoded text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RisonError {
    #[error("\"!\" at end of input (byte {0})")]
    UnexpectedEnd(usize),
    #[error("empty expression at byte {0}")]
    EmptyExpression(usize),
    #[error("invalid character {ch:?} at byte {offset}")]
    InvalidCharacter { offset: usize, ch: char },
    #[error("unknown literal \"!{literal}\" at byte {offset}")]
    UnknownLiteral { offset: usize, literal: char },
    #[error("invalid string escape \"!{ch}\" at byte {offset}")]
    InvalidEscape { offset: usize, ch: char },
    #[error("unmatched \"'\" opened at byte {0}")]
    UnmatchedQuote(usize),
    #[error("unmatched \"(\" opened at byte {0}")]
    UnmatchedParen(usize),
    #[error("missing ',' at byte {0}")]
    MissingComma(usize),
    #[error("extra ',' at byte {0}")]
    ExtraComma(usize),
    #[error("missing ':' at byte {0}")]
    MissingColon(usize),
    #[error("invalid number at byte {0}")]
    InvalidNumber(usize),
    #[error("object key at byte {0} is neither a string nor a number")]
    InvalidKey(usize),
    #[error("unable to parse trailing input at byte {0}")]
    TrailingInput(usize),
    #[error("nesting deeper than {limit} levels at byte {offset}")]
    DepthLimitExceeded { offset: usize, limit: usize },
}

impl RisonError {
    pub fn kind(&self) -> RisonErrorKind {
        match self {
            RisonError::DepthLimitExceeded { .. } => RisonErrorKind::LimitExceeded,
            _ => RisonErrorKind::MalformedInput,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            RisonError::UnexpectedEnd(offset)
            | RisonError::EmptyExpression(offset)
            | RisonError::UnmatchedQuote(offset)
            | RisonError::UnmatchedParen(offset)
            | RisonError::MissingComma(offset)
            | RisonError::ExtraComma(offset)
            | RisonError::MissingColon(offset)
            | RisonError::InvalidNumber(offset)
            | RisonError::InvalidKey(offset)
            | RisonError::TrailingInput(offset) => *offset,
            RisonError::InvalidCharacter { offset, .. }
            | RisonError::UnknownLiteral { offset, .. }
            | RisonError::InvalidEscape { offset, .. }
            | RisonError::DepthLimitExceeded { offset, .. } => *offset,
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        self.kind() == RisonErrorKind::MalformedInput
    }
}

//! Codec error type.
//!
//! Every fallible operation in the crate returns [`Result`](type.Result.html).
//! The variant identifies the kind of failure; its `Display` output is the
//! human-readable diagnostic.

use std::result;

use thiserror::Error;

use crate::universal::EncodedType;

/// Type alias for the standard `Result` with the fixed `BerError` error type.
pub type Result<T> = result::Result<T, BerError>;

/// Failure kinds of the codec.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BerError {
    /// The buffer ended before a complete header or content region.
    #[error("truncated input at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Long-form tag number needs more than four continuation octets.
    #[error("tag number at offset {offset} exceeds four continuation octets")]
    TagOverflow { offset: usize },

    /// Long-form length doesn't fit the platform's size type.
    #[error("length at offset {offset} is not representable")]
    LengthOverflow { offset: usize },

    /// Length octet 0x80.
    #[error("indefinite length at offset {offset} is not supported")]
    UnsupportedIndefiniteLength { offset: usize },

    /// An accessor was applied to an element of a different type or shape.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Element content violates the rules of its type.
    #[error("malformed {kind} value: {reason}")]
    MalformedValue {
        kind: EncodedType,
        reason: &'static str,
    },

    /// A directive letter disagrees with the tree, the argument list, or the
    /// value it meets.
    #[error("directive '{letter}' at position {position}: {reason}")]
    DirectiveMismatch {
        letter: char,
        position: usize,
        reason: String,
    },

    /// Scope closed past depth zero, or left open at the end.
    #[error("unbalanced scope at directive position {position}")]
    UnbalancedScope { position: usize },

    /// Constructed elements nested deeper than the reader allows.
    #[error("nesting depth at offset {offset} exceeds the limit of {limit}")]
    DepthExceeded { offset: usize, limit: usize },

    /// A value can't be represented in the encoding.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The output buffer couldn't be reserved.
    #[error("cannot allocate {0} bytes for the encoded output")]
    AllocationFailure(usize),
}

impl BerError {
    pub(crate) fn truncated(offset: usize, needed: usize, available: usize) -> BerError {
        BerError::TruncatedInput {
            offset,
            needed,
            available,
        }
    }

    pub(crate) fn mismatch<E: ToString, F: ToString>(expected: E, found: F) -> BerError {
        BerError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn malformed(kind: EncodedType, reason: &'static str) -> BerError {
        BerError::MalformedValue { kind, reason }
    }
}

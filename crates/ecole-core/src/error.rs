//! Error types for the Ecole core.

use thiserror::Error;

use crate::types::{Amount, RecordId};

/// Errors raised while encoding, decoding or patching records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown field `{field}` for {kind}")]
    UnknownField { kind: &'static str, field: String },

    #[error("field `{field}` of {kind} cannot be changed")]
    ImmutableField { kind: &'static str, field: String },

    #[error("{0} record has no string `id`")]
    MissingId(&'static str),

    #[error("patch would leave {kind} `{id}` unreadable: {reason}")]
    InvalidPatch {
        kind: &'static str,
        id: RecordId,
        reason: String,
    },

    #[error("{0} records cannot be modified once created")]
    ImmutableRecord(&'static str),

    #[error("invalid month `{0}`, expected YYYY-MM")]
    InvalidMonth(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            CoreError::Decoding(e.to_string())
        } else {
            CoreError::Encoding(e.to_string())
        }
    }
}

/// Errors from salary reconciliation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    #[error("{field} must not be negative, got {amount}")]
    NegativeAmount { field: &'static str, amount: Amount },

    #[error("advance amount must be positive, got {0}")]
    InvalidAdvance(Amount),

    #[error("salary totals overflowed")]
    Overflow,

    #[error("salary {0} is finalized and cannot be recomputed")]
    Finalized(RecordId),
}

/// Errors from attachment validation. Each error concerns a single file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("{name} is not a valid PDF file")]
    NotPdf { name: String },

    #[error("{name} exceeds the maximum size of {limit} bytes ({size} bytes)")]
    TooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    #[error("malformed attachment data: {0}")]
    MalformedData(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

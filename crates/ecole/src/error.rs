//! Error types for the facade.

use ecole_core::{AttachmentError, CoreError, EntityKind, PayrollError, RecordId};
use ecole_store::StoreError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during facade operations.
#[derive(Debug, Error)]
pub enum SchoolError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Record encoding or schema error.
    #[error("record error: {0}")]
    Record(#[from] CoreError),

    /// Payroll rule violated.
    #[error("payroll error: {0}")]
    Payroll(#[from] PayrollError),

    /// Attachment refused.
    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    /// A record the operation depends on does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: RecordId },

    /// Seed fixture could not be read.
    #[error("cannot read seed fixture: {0}")]
    Seed(#[from] std::io::Error),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, SchoolError>;

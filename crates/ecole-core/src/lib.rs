//! # Ecole Core
//!
//! Pure building blocks for the Ecole school register: record types,
//! storage schemas, payroll arithmetic and attachment handling.
//!
//! This crate performs no I/O. Storage lives in `ecole-store`; the facade
//! that ties both together lives in `ecole`.
//!
//! ## Key Types
//!
//! - [`Entity`] / [`EntityKind`] - Typed records and their discriminator
//! - [`EntitySchema`] - Field ↔ column mapping for one kind
//! - [`Patch`] - A partial record used by updates
//! - [`payroll::reconcile`] - Salary vs. advances reconciliation
//! - [`SeedData`] - The first-run sample dataset

pub mod attachment;
pub mod entity;
pub mod error;
pub mod models;
pub mod payroll;
pub mod schema;
pub mod seed;
pub mod types;

pub use attachment::{accept_batch, validate_pdf, BatchOutcome, UploadedFile};
pub use entity::{Document, Entity, EntityKind, Patch};
pub use error::{AttachmentError, CoreError, PayrollError, Result};
pub use models::*;
pub use payroll::{Reconciliation, SalaryInputs, SalaryRequest, SalaryStatus};
pub use schema::{ColumnType, EntitySchema, FieldSpec, OrderBy, Row};
pub use seed::SeedData;
pub use types::{Amount, Month, RecordId};

//! # Ecole Testkit
//!
//! Testing utilities for Ecole.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Worked payroll examples with expected results
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Facades over each backend and fully populated records
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ecole_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let r = vector.reconcile().unwrap();
//!     assert_eq!(r.status, vector.expected_status);
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ecole_testkit::fixtures::{local_db, sample_documents};
//!
//! let db = local_db();
//! assert_eq!(sample_documents().len(), 20);
//! # drop(db);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{local_db, sample_documents, sqlite_db, LocalDb, SqliteDb};

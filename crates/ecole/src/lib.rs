//! # Ecole
//!
//! The school records facade: one asynchronous API over interchangeable
//! storage backends, plus the payroll and messaging workflows built on it.
//!
//! ## Overview
//!
//! - **Records**: typed `list` / `get` / `add` / `update` / `delete` for every
//!   entity kind, through [`SchoolDb`]
//! - **Backends**: chosen once at composition, from [`SchoolConfig`] or by
//!   passing a store to [`SchoolDb::new`]
//! - **Payroll**: advances, salary reconciliation, finalization and monthly
//!   cost, through [`PayrollService`]
//! - **Messaging**: administration replies and parent notifications
//! - **Attachments**: inline PDF documents on homework, staff, room schedule
//!   and online registration records
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ecole::{DynSchoolDb, SchoolConfig};
//! use ecole::core::Student;
//!
//! async fn example() {
//!     let config = SchoolConfig::from_env().unwrap();
//!     let db = DynSchoolDb::open(&config).unwrap();
//!     db.initialize_default_data().await.unwrap();
//!
//!     let students: Vec<Student> = db.list().await.unwrap();
//!     println!("{} students", students.len());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ecole::core` - Record types, schemas and payroll arithmetic
//! - `ecole::store` - The record store trait and its backends

pub mod attachments;
pub mod config;
pub mod db;
pub mod error;
pub mod messaging;
pub mod payroll;

// Re-export component crates
pub use ecole_core as core;
pub use ecole_store as store;

// Re-export main types for convenience
pub use attachments::Attachable;
pub use config::{ConfigError, RemoteTarget, SchoolConfig};
pub use db::{DynSchoolDb, SchoolDb};
pub use error::{Result, SchoolError};
pub use messaging::ParentReply;
pub use payroll::{AdvanceRequest, PayrollService};

pub use ecole_store::{BackendKind, RecordStore, SeedOutcome};

//! # Ecole Store
//!
//! Storage abstraction for Ecole. Provides the [`RecordStore`] trait and its
//! two backends.
//!
//! ## Overview
//!
//! The facade never knows which substrate holds its records. The local
//! backend ([`LocalStore`]) keeps one JSON array per entity kind in a
//! [`KeyValue`] substrate, the way a browser keeps local storage. The remote
//! backend ([`RemoteStore`]) translates records to rows through each kind's
//! schema and hands them to a [`RowStore`] client: [`SqliteRowStore`] for an
//! embedded database, [`RestRowStore`] for a hosted PostgREST service.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - The async trait for record persistence
//! - [`RecordStoreExt`] - Typed helpers (`list_records::<Student>()` …)
//! - [`LocalStore`] over [`MemoryKv`] or [`FileKv`]
//! - [`RemoteStore`] over [`SqliteRowStore`] or [`RestRowStore`]
//! - [`SeedOutcome`] - Result of first-run initialization
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ecole_core::Subject;
//! use ecole_store::{LocalStore, MemoryKv, RecordStoreExt};
//!
//! async fn example() {
//!     let store = LocalStore::new(MemoryKv::new());
//!     let subjects: Vec<Subject> = store.list_records().await.unwrap();
//!     assert!(subjects.is_empty());
//! }
//! ```

pub mod error;
pub mod kv;
pub mod local;
pub mod migration;
pub mod remote;
pub mod rest;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use kv::{FileKv, KeyValue, MemoryKv};
pub use local::LocalStore;
pub use remote::{RemoteStore, RowStore};
pub use rest::RestRowStore;
pub use sqlite::SqliteRowStore;
pub use traits::{BackendKind, RecordStore, RecordStoreExt, SeedOutcome};

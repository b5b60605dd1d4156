//! SchoolDb: the record store facade.
//!
//! The facade owns a [`RecordStore`] chosen at composition time and exposes
//! the typed per-kind contract (`list`, `get`, `add`, `update`, `delete`) plus
//! first-run initialization. Every operation is asynchronous and every
//! failure is returned to the caller.

use std::path::Path;
use std::sync::Arc;

use ecole_core::{Entity, EntityKind, Patch, PayrollError, RecordId, SeedData, TeacherSalary};
use ecole_store::{
    BackendKind, FileKv, LocalStore, MemoryKv, RecordStore, RecordStoreExt, RemoteStore,
    RestRowStore, SeedOutcome, SqliteRowStore,
};

use crate::config::{RemoteTarget, SchoolConfig};
use crate::error::{Result, SchoolError};
use crate::payroll::PayrollService;

/// A facade whose backend was chosen at run time.
pub type DynSchoolDb = SchoolDb<dyn RecordStore>;

/// The school records facade.
pub struct SchoolDb<S: RecordStore + ?Sized> {
    /// The storage backend.
    store: Arc<S>,
    /// Dataset written on first run. Falls back to the built-in fixture.
    seed: Option<SeedData>,
    payroll: PayrollService<S>,
}

impl<S: RecordStore> SchoolDb<S> {
    /// Create a facade over a store.
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }
}

impl DynSchoolDb {
    /// Build the backend described by `config`.
    pub fn open(config: &SchoolConfig) -> Result<Self> {
        let store: Arc<dyn RecordStore> = match &config.remote {
            None => match &config.data_dir {
                Some(dir) => {
                    tracing::info!(backend = "local", data_dir = %dir.display(), "opening record store");
                    Arc::new(LocalStore::new(FileKv::open(dir)?))
                }
                None => {
                    tracing::info!(backend = "local", "opening in-memory record store");
                    Arc::new(LocalStore::new(MemoryKv::new()))
                }
            },
            Some(RemoteTarget::Sqlite(path)) => {
                let rows = match path {
                    Some(path) => {
                        tracing::info!(backend = "remote", path = %path.display(), "opening sqlite record store");
                        SqliteRowStore::open(path)?
                    }
                    None => {
                        tracing::info!(backend = "remote", "opening in-memory sqlite record store");
                        SqliteRowStore::open_memory()?
                    }
                };
                Arc::new(RemoteStore::new(rows))
            }
            Some(RemoteTarget::Rest { url, api_key }) => {
                tracing::info!(backend = "remote", url = %url, "opening rest record store");
                Arc::new(RemoteStore::new(RestRowStore::new(url.as_str(), api_key.as_str())?))
            }
        };

        let mut db = Self::from_arc(store);
        if let Some(path) = &config.seed_path {
            db = db.with_seed(load_seed(path)?);
        }
        Ok(db)
    }
}

impl<S: RecordStore + ?Sized> SchoolDb<S> {
    /// Create a facade over a shared store.
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            payroll: PayrollService::new(Arc::clone(&store)),
            store,
            seed: None,
        }
    }

    /// Use `seed` instead of the built-in dataset on first run.
    pub fn with_seed(mut self, seed: SeedData) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn backend(&self) -> BackendKind {
        self.store.backend()
    }

    /// Payroll operations over this facade's store.
    pub fn payroll(&self) -> &PayrollService<S> {
        &self.payroll
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All records of kind `E`.
    pub async fn list<E: Entity>(&self) -> Result<Vec<E>> {
        Ok(self.store.list_records::<E>().await?)
    }

    /// The record of kind `E` with `id`, if any.
    pub async fn get<E: Entity>(&self, id: &RecordId) -> Result<Option<E>> {
        Ok(self.store.find_record::<E>(id).await?)
    }

    /// Like [`get`](Self::get), but a missing record is an error.
    pub async fn require<E: Entity>(&self, id: &RecordId) -> Result<E> {
        self.get::<E>(id).await?.ok_or_else(|| SchoolError::NotFound {
            kind: E::KIND,
            id: id.clone(),
        })
    }

    /// Append a record. The caller supplies a fresh id.
    pub async fn add<E: Entity>(&self, record: &E) -> Result<()> {
        Ok(self.store.add_record(record).await?)
    }

    /// Merge `patch` into the record with `id`. Unknown ids are ignored.
    ///
    /// Finalized salaries are rejected with [`PayrollError::Finalized`].
    pub async fn update<E: Entity>(&self, id: &RecordId, patch: Patch<E>) -> Result<()> {
        if E::KIND == EntityKind::TeacherSalary {
            let salary = self.store.find_record::<TeacherSalary>(id).await?;
            if salary.is_some_and(|s| s.is_finalized()) {
                return Err(PayrollError::Finalized(id.clone()).into());
            }
        }
        Ok(self.store.update_record(id, patch).await?)
    }

    /// Remove the record with `id`. Unknown ids are ignored.
    pub async fn delete<E: Entity>(&self, id: &RecordId) -> Result<()> {
        Ok(self.store.delete_record::<E>(id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Initialization
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the sample dataset on first run.
    ///
    /// The local backend seeds once and records a sentinel; later calls are
    /// no-ops. The remote backend is provisioned externally and only reports
    /// whether it holds any users.
    pub async fn initialize_default_data(&self) -> Result<SeedOutcome> {
        let outcome = match &self.seed {
            Some(seed) => self.store.initialize(seed).await?,
            None => self.store.initialize(&SeedData::builtin()?).await?,
        };
        tracing::info!(backend = self.backend().as_str(), outcome = ?outcome, "default data initialized");
        Ok(outcome)
    }
}

/// Read a seed fixture from disk.
pub fn load_seed(path: &Path) -> Result<SeedData> {
    let json = std::fs::read_to_string(path)?;
    Ok(SeedData::from_json(&json)?)
}

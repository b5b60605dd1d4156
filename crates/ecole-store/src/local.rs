//! The local backend: one JSON array per entity kind in a key-value
//! substrate.

use std::sync::Mutex;

use async_trait::async_trait;
use ecole_core::entity::{document_id, merge_document};
use ecole_core::{Document, EntityKind, EntitySchema, RecordId, SeedData};

use crate::error::{Result, StoreError};
use crate::kv::KeyValue;
use crate::traits::{BackendKind, RecordStore, SeedOutcome};

/// Key marking a substrate that has been seeded.
pub const SENTINEL_KEY: &str = "dataInitialized";

/// Record store over a [`KeyValue`] substrate.
///
/// Every mutation is a read-modify-write of a whole collection; an internal
/// mutex serializes them so concurrent writers never lose each other's
/// records.
pub struct LocalStore<K> {
    kv: K,
    write_lock: Mutex<()>,
}

impl<K: KeyValue> LocalStore<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying substrate.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Whether the sentinel key is present.
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.kv.get_item(SENTINEL_KEY)?.is_some())
    }

    fn read_collection(&self, schema: &EntitySchema) -> Result<Vec<Document>> {
        let Some(raw) = self.kv.get_item(schema.storage_key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Document>>(&raw) {
            Ok(docs) => Ok(docs),
            Err(e) => {
                tracing::warn!(
                    key = schema.storage_key,
                    error = %e,
                    "unreadable collection, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    fn write_collection(&self, schema: &EntitySchema, docs: &[Document]) -> Result<()> {
        let raw = serde_json::to_string(docs)?;
        self.kv.set_item(schema.storage_key, &raw).map_err(|e| {
            tracing::error!(key = schema.storage_key, error = %e, "failed to write collection");
            e
        })
    }

    /// Run a read-modify-write of one collection under the write lock.
    /// `f` returns whether it changed anything.
    fn modify<F>(&self, schema: &EntitySchema, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Document>) -> bool,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {}", e)))?;

        let mut docs = self.read_collection(schema)?;
        if f(&mut docs) {
            self.write_collection(schema, &docs)?;
        }
        Ok(())
    }

    fn seed(&self, seed: &SeedData) -> Result<SeedOutcome> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {}", e)))?;

        if self.is_initialized()? {
            tracing::info!("local store already initialized");
            return Ok(SeedOutcome::AlreadySeeded);
        }

        self.kv.clear()?;
        self.kv.set_item(SENTINEL_KEY, "true")?;
        for (kind, docs) in seed.collections()? {
            self.write_collection(kind.schema(), &docs)?;
        }

        let records = seed.record_count();
        tracing::info!(records, "local store seeded");
        Ok(SeedOutcome::Seeded { records })
    }
}

#[async_trait]
impl<K: KeyValue> RecordStore for LocalStore<K> {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>> {
        self.read_collection(kind.schema())
    }

    async fn add(&self, kind: EntityKind, record: Document) -> Result<()> {
        let schema = kind.schema();
        schema.check_document(&record)?;
        self.modify(schema, |docs| {
            docs.push(record);
            true
        })
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, patch: Document) -> Result<()> {
        let schema = kind.schema();
        schema.check_patch(&patch)?;
        self.modify(schema, |docs| {
            match docs
                .iter_mut()
                .find(|doc| document_id(doc) == Some(id.as_str()))
            {
                Some(doc) => {
                    merge_document(doc, &patch);
                    true
                }
                None => {
                    tracing::debug!(kind = %kind, id = %id, "update of unknown record ignored");
                    false
                }
            }
        })
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()> {
        self.modify(kind.schema(), |docs| {
            let before = docs.len();
            docs.retain(|doc| document_id(doc) != Some(id.as_str()));
            docs.len() != before
        })
    }

    async fn initialize(&self, seed: &SeedData) -> Result<SeedOutcome> {
        self.seed(seed)
    }
}

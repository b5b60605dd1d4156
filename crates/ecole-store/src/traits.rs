//! RecordStore trait: the abstract interface for record persistence.
//!
//! The facade is backend-agnostic. Implementations include [`LocalStore`]
//! (key-value substrate) and [`RemoteStore`] (relational substrate).
//!
//! [`LocalStore`]: crate::LocalStore
//! [`RemoteStore`]: crate::RemoteStore

use std::sync::Arc;

use async_trait::async_trait;
use ecole_core::entity::{document_id, merge_document};
use ecole_core::{CoreError, Document, Entity, EntityKind, Patch, RecordId, SeedData};

use crate::error::Result;

/// Which substrate a store writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

/// Result of first-run initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The substrate was reset and the sample dataset written.
    Seeded { records: usize },
    /// The substrate had already been initialized; nothing was written.
    AlreadySeeded,
    /// The remote backend is provisioned externally; nothing was written.
    RemoteManaged { has_users: bool },
}

/// The RecordStore trait: async interface for record persistence.
///
/// Records cross this boundary as camelCase documents. Every method checks
/// the document against the kind's schema before touching the substrate.
///
/// # Semantics
///
/// - **Unknown ids**: `update` and `delete` of an id that is not stored are
///   no-ops, not errors.
/// - **No uniqueness check** on `add`: callers supply fresh ids.
/// - **Errors propagate**: a failed write is never swallowed.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The substrate this store writes to.
    fn backend(&self) -> BackendKind;

    /// All records of a kind.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>>;

    /// Append a record.
    async fn add(&self, kind: EntityKind, record: Document) -> Result<()>;

    /// Merge `patch` into the record with the given id.
    async fn update(&self, kind: EntityKind, id: &RecordId, patch: Document) -> Result<()>;

    /// Remove the record with the given id.
    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()>;

    /// First-run initialization with the sample dataset.
    async fn initialize(&self, seed: &SeedData) -> Result<SeedOutcome>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn backend(&self) -> BackendKind {
        (**self).backend()
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>> {
        (**self).list(kind).await
    }

    async fn add(&self, kind: EntityKind, record: Document) -> Result<()> {
        (**self).add(kind, record).await
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, patch: Document) -> Result<()> {
        (**self).update(kind, id, patch).await
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()> {
        (**self).delete(kind, id).await
    }

    async fn initialize(&self, seed: &SeedData) -> Result<SeedOutcome> {
        (**self).initialize(seed).await
    }
}

/// Typed convenience layer over [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    /// All records of kind `E`, decoded.
    fn list_records<E: Entity>(&self) -> impl std::future::Future<Output = Result<Vec<E>>> + Send;

    /// The record of kind `E` with the given id, if stored.
    fn find_record<E: Entity>(
        &self,
        id: &RecordId,
    ) -> impl std::future::Future<Output = Result<Option<E>>> + Send;

    /// Encode and append a record.
    fn add_record<E: Entity>(&self, record: &E)
        -> impl std::future::Future<Output = Result<()>> + Send;

    /// Apply a typed patch.
    ///
    /// The patch is merged into the stored record first; if the result no
    /// longer decodes as `E` nothing is written.
    fn update_record<E: Entity>(
        &self,
        id: &RecordId,
        patch: Patch<E>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove a record of kind `E`.
    fn delete_record<E: Entity>(
        &self,
        id: &RecordId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {
    async fn list_records<E: Entity>(&self) -> Result<Vec<E>> {
        let docs = self.list(E::KIND).await?;
        let records = docs
            .into_iter()
            .map(E::from_document)
            .collect::<ecole_core::Result<Vec<E>>>()?;
        Ok(records)
    }

    async fn find_record<E: Entity>(&self, id: &RecordId) -> Result<Option<E>> {
        let records = self.list_records::<E>().await?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }

    async fn add_record<E: Entity>(&self, record: &E) -> Result<()> {
        let doc = record.to_document()?;
        self.add(E::KIND, doc).await
    }

    async fn update_record<E: Entity>(&self, id: &RecordId, patch: Patch<E>) -> Result<()> {
        let patch = patch.into_document();
        E::KIND.schema().check_patch(&patch)?;

        let stored = self
            .list(E::KIND)
            .await?
            .into_iter()
            .find(|doc| document_id(doc) == Some(id.as_str()));
        if let Some(mut merged) = stored {
            merge_document(&mut merged, &patch);
            E::from_document(merged).map_err(|e| CoreError::InvalidPatch {
                kind: E::KIND.name(),
                id: id.clone(),
                reason: e.to_string(),
            })?;
        }

        self.update(E::KIND, id, patch).await
    }

    async fn delete_record<E: Entity>(&self, id: &RecordId) -> Result<()> {
        self.delete(E::KIND, id).await
    }
}

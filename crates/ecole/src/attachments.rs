//! PDF attachments on records that carry a `documents` list.

use ecole_core::attachment::{self, BatchOutcome, UploadedFile};
use ecole_core::{Entity, Homework, OnlineRegistration, Patch, RecordId, RoomSchedule, Staff};
use ecole_store::RecordStore;

use crate::db::SchoolDb;
use crate::error::Result;

/// A record kind with inline PDF attachments.
pub trait Attachable: Entity {
    fn documents(&self) -> &[String];
}

impl Attachable for Homework {
    fn documents(&self) -> &[String] {
        &self.documents
    }
}

impl Attachable for Staff {
    fn documents(&self) -> &[String] {
        &self.documents
    }
}

impl Attachable for RoomSchedule {
    fn documents(&self) -> &[String] {
        &self.documents
    }
}

impl Attachable for OnlineRegistration {
    fn documents(&self) -> &[String] {
        &self.documents
    }
}

impl<S: RecordStore + ?Sized> SchoolDb<S> {
    /// Validate `uploads` and append the accepted ones to the record's
    /// documents, keeping at most `max_files`.
    ///
    /// Rejected files are reported in the outcome and do not stop their
    /// siblings. Fails with `NotFound` if the record does not exist.
    pub async fn attach_documents<E: Attachable>(
        &self,
        id: &RecordId,
        uploads: &[UploadedFile],
        max_files: usize,
    ) -> Result<BatchOutcome> {
        let record = self.require::<E>(id).await?;
        let outcome = attachment::accept_batch(record.documents(), uploads, max_files);

        for rejected in &outcome.rejected {
            tracing::warn!(kind = %E::KIND, id = %id, error = %rejected, "attachment rejected");
        }
        if outcome.files.as_slice() != record.documents() {
            let patch = Patch::<E>::new().set_serialized("documents", &outcome.files)?;
            self.update(id, patch).await?;
        }
        Ok(outcome)
    }

    /// Remove the attachment at `index` from the record's documents.
    pub async fn remove_document<E: Attachable>(&self, id: &RecordId, index: usize) -> Result<Vec<String>> {
        let record = self.require::<E>(id).await?;
        let files = attachment::remove_at(record.documents(), index);
        if files.len() != record.documents().len() {
            let patch = Patch::<E>::new().set_serialized("documents", &files)?;
            self.update(id, patch).await?;
        }
        Ok(files)
    }
}

//! The remote backend: records as rows of a relational service.

use async_trait::async_trait;
use ecole_core::{Document, EntityKind, EntitySchema, RecordId, Row, SeedData};

use crate::error::Result;
use crate::traits::{BackendKind, RecordStore, SeedOutcome};

/// The fixed client the remote backend talks to.
///
/// Rows are keyed by snake_case column names. Implementations return rows in
/// the schema's [`OrderBy`](ecole_core::OrderBy).
#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows of a table, in schema order.
    async fn select(&self, schema: &'static EntitySchema) -> Result<Vec<Row>>;

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<()>;

    /// Set the given columns on the row with `id`. Unknown ids match nothing.
    async fn update(&self, schema: &'static EntitySchema, id: &RecordId, row: Row) -> Result<()>;

    /// Delete the row with `id`. Unknown ids match nothing.
    async fn delete(&self, schema: &'static EntitySchema, id: &RecordId) -> Result<()>;

    /// Whether the table holds at least one row.
    async fn exists_any(&self, schema: &'static EntitySchema) -> Result<bool>;
}

/// Record store over a [`RowStore`].
///
/// Documents are translated to rows by the kind's schema on the way in and
/// back on the way out.
pub struct RemoteStore<R> {
    rows: R,
}

impl<R: RowStore> RemoteStore<R> {
    pub fn new(rows: R) -> Self {
        Self { rows }
    }

    /// The underlying row client.
    pub fn rows(&self) -> &R {
        &self.rows
    }
}

#[async_trait]
impl<R: RowStore> RecordStore for RemoteStore<R> {
    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>> {
        let schema = kind.schema();
        let rows = self.rows.select(schema).await?;
        Ok(rows.iter().map(|row| schema.from_row(row)).collect())
    }

    async fn add(&self, kind: EntityKind, record: Document) -> Result<()> {
        let schema = kind.schema();
        schema.check_document(&record)?;
        let row = schema.to_row(&record)?;
        self.rows.insert(schema, row).await.map_err(|e| {
            tracing::error!(table = schema.table, error = %e, "remote insert failed");
            e
        })
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, patch: Document) -> Result<()> {
        let schema = kind.schema();
        let row = schema.patch_to_row(&patch)?;
        if row.is_empty() {
            return Ok(());
        }
        self.rows.update(schema, id, row).await.map_err(|e| {
            tracing::error!(table = schema.table, id = %id, error = %e, "remote update failed");
            e
        })
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()> {
        let schema = kind.schema();
        self.rows.delete(schema, id).await.map_err(|e| {
            tracing::error!(table = schema.table, id = %id, error = %e, "remote delete failed");
            e
        })
    }

    async fn initialize(&self, _seed: &SeedData) -> Result<SeedOutcome> {
        let has_users = self.rows.exists_any(EntityKind::User.schema()).await?;
        if has_users {
            tracing::info!("remote backend has users");
        } else {
            tracing::info!("remote backend has no users yet");
        }
        Ok(SeedOutcome::RemoteManaged { has_users })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::sqlite::SqliteRowStore;
    use crate::traits::RecordStoreExt;
    use ecole_core::{CoreError, Patch, Room, RoomType};

    fn store() -> RemoteStore<SqliteRowStore> {
        RemoteStore::new(SqliteRowStore::open_memory().unwrap())
    }

    fn room(id: &str) -> Room {
        Room {
            id: RecordId::new(id),
            name: format!("Salle {}", id),
            capacity: 30,
            room_type: RoomType::Classroom,
            equipment: vec!["Tableau".to_string(), "Projecteur".to_string()],
            is_available: true,
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let store = store();
        store.add_record(&room("1")).await.unwrap();

        let rooms: Vec<Room> = store.list_records().await.unwrap();
        assert_eq!(rooms, vec![room("1")]);
    }

    #[tokio::test]
    async fn test_patch_translated_to_columns() {
        let store = store();
        store.add_record(&room("1")).await.unwrap();

        let patch = Patch::<Room>::new().set("isAvailable", false);
        store.update_record(&RecordId::new("1"), patch).await.unwrap();

        let updated: Room = store.find_record(&RecordId::new("1")).await.unwrap().unwrap();
        assert!(!updated.is_available);
        assert_eq!(updated.equipment.len(), 2);
    }

    #[tokio::test]
    async fn test_id_cannot_be_patched() {
        let store = store();
        let mut patch = Document::new();
        patch.insert("id".to_string(), "2".into());

        let err = store
            .update(EntityKind::Room, &RecordId::new("1"), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Record(CoreError::ImmutableField { .. })));
    }

    #[tokio::test]
    async fn test_initialize_writes_nothing() {
        let store = store();
        let seed = SeedData::builtin().unwrap();
        assert_eq!(
            store.initialize(&seed).await.unwrap(),
            SeedOutcome::RemoteManaged { has_users: false }
        );
        assert!(store.list(EntityKind::Subject).await.unwrap().is_empty());
    }
}

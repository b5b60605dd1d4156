//! Entity kinds and the typed record abstraction.
//!
//! Every record kind is a serde struct with camelCase field names. Stores
//! work on the untyped [`Document`] form; the [`Entity`] trait converts
//! between the two.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::schema::{self, EntitySchema};
use crate::types::RecordId;

/// A record in its field-name keyed JSON form.
pub type Document = serde_json::Map<String, Value>;

/// Discriminator for every record kind in the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    User,
    Student,
    Class,
    Subject,
    Grade,
    Payment,
    Staff,
    InventoryItem,
    News,
    Event,
    Homework,
    OnlineRegistration,
    Room,
    RoomSchedule,
    Attendance,
    Message,
    ParentNotification,
    TeacherSalary,
    TeacherAdvance,
    MonthlySalaryCost,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 20] = [
        EntityKind::User,
        EntityKind::Student,
        EntityKind::Class,
        EntityKind::Subject,
        EntityKind::Grade,
        EntityKind::Payment,
        EntityKind::Staff,
        EntityKind::InventoryItem,
        EntityKind::News,
        EntityKind::Event,
        EntityKind::Homework,
        EntityKind::OnlineRegistration,
        EntityKind::Room,
        EntityKind::RoomSchedule,
        EntityKind::Attendance,
        EntityKind::Message,
        EntityKind::ParentNotification,
        EntityKind::TeacherSalary,
        EntityKind::TeacherAdvance,
        EntityKind::MonthlySalaryCost,
    ];

    /// The declarative schema for this kind.
    pub fn schema(self) -> &'static EntitySchema {
        schema::schema_for(self)
    }

    /// Human readable name, e.g. `"RoomSchedule"`.
    pub fn name(self) -> &'static str {
        self.schema().name
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed record kind.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The kind discriminator.
    const KIND: EntityKind;

    /// The record identifier.
    fn id(&self) -> &RecordId;

    /// Encode into the untyped document form.
    fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(doc) => Ok(doc),
            other => Err(CoreError::Encoding(format!(
                "{} did not encode to an object: {}",
                Self::KIND,
                other
            ))),
        }
    }

    /// Decode from the untyped document form.
    fn from_document(doc: Document) -> Result<Self> {
        serde_json::from_value(Value::Object(doc))
            .map_err(|e| CoreError::Decoding(format!("{}: {}", Self::KIND, e)))
    }
}

/// A partial record: the subset of fields an update should merge.
///
/// A `null` value clears an optional field.
pub struct Patch<E> {
    fields: Document,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Patch<E> {
    /// An empty patch.
    pub fn new() -> Self {
        Self {
            fields: Document::new(),
            _entity: PhantomData,
        }
    }

    /// Set a field to a JSON-convertible value.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Set a field to any serializable value (enums, months, nested records).
    pub fn set_serialized<V: Serialize>(mut self, field: &str, value: &V) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        self.fields.insert(field.to_string(), value);
        Ok(self)
    }

    /// Clear an optional field.
    pub fn clear(mut self, field: &str) -> Self {
        self.fields.insert(field.to_string(), Value::Null);
        self
    }

    /// Build from an arbitrary document, validating it against the schema.
    pub fn from_document(fields: Document) -> Result<Self> {
        E::KIND.schema().check_patch(&fields)?;
        Ok(Self {
            fields,
            _entity: PhantomData,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn into_document(self) -> Document {
        self.fields
    }
}

impl<E: Entity> Default for Patch<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Patch<E> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Patch<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch").field("fields", &self.fields).finish()
    }
}

/// Merge a patch into a stored document. Null values remove the field.
pub fn merge_document(target: &mut Document, patch: &Document) {
    for (field, value) in patch {
        if value.is_null() {
            target.remove(field);
        } else {
            target.insert(field.clone(), value.clone());
        }
    }
}

/// Extract the `id` of a stored document.
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_document() {
        let mut doc = json!({"id": "1", "name": "CM2 A", "maxStudents": 30})
            .as_object()
            .cloned()
            .unwrap();
        let patch = json!({"maxStudents": 32, "name": null})
            .as_object()
            .cloned()
            .unwrap();

        merge_document(&mut doc, &patch);

        assert_eq!(doc.get("maxStudents"), Some(&json!(32)));
        assert!(!doc.contains_key("name"));
        assert_eq!(document_id(&doc), Some("1"));
    }

    #[test]
    fn test_every_kind_has_a_schema() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.schema().kind, kind);
            assert!(kind.schema().field("id").is_some(), "{kind} lacks id");
        }
    }
}

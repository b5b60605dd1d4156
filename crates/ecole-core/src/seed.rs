//! The first-run sample dataset.
//!
//! The dataset is a JSON fixture. A copy is compiled into the crate
//! ([`SeedData::builtin`]); deployments can supply their own file instead.

use serde::Deserialize;

use crate::entity::{Document, Entity, EntityKind};
use crate::error::Result;
use crate::models::{
    Attendance, Event, Grade, Homework, InventoryItem, Message, News, Payment, Room, SchoolClass,
    Staff, Student, Subject, User,
};

const BUILTIN_SEED: &str = include_str!("../fixtures/seed.json");

/// Sample records written on first run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedData {
    pub users: Vec<User>,
    pub subjects: Vec<Subject>,
    pub classes: Vec<SchoolClass>,
    pub students: Vec<Student>,
    pub grades: Vec<Grade>,
    pub payments: Vec<Payment>,
    pub staff: Vec<Staff>,
    pub inventory: Vec<InventoryItem>,
    pub news: Vec<News>,
    pub events: Vec<Event>,
    pub rooms: Vec<Room>,
    pub homework: Vec<Homework>,
    pub attendance: Vec<Attendance>,
    pub messages: Vec<Message>,
}

impl SeedData {
    /// The dataset shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SEED)
    }

    /// Parse a dataset from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of records.
    pub fn record_count(&self) -> usize {
        self.users.len()
            + self.subjects.len()
            + self.classes.len()
            + self.students.len()
            + self.grades.len()
            + self.payments.len()
            + self.staff.len()
            + self.inventory.len()
            + self.news.len()
            + self.events.len()
            + self.rooms.len()
            + self.homework.len()
            + self.attendance.len()
            + self.messages.len()
    }

    /// The dataset as documents grouped by kind, in write order.
    pub fn collections(&self) -> Result<Vec<(EntityKind, Vec<Document>)>> {
        Ok(vec![
            documents(&self.users)?,
            documents(&self.subjects)?,
            documents(&self.classes)?,
            documents(&self.students)?,
            documents(&self.grades)?,
            documents(&self.payments)?,
            documents(&self.staff)?,
            documents(&self.inventory)?,
            documents(&self.news)?,
            documents(&self.events)?,
            documents(&self.rooms)?,
            documents(&self.homework)?,
            documents(&self.attendance)?,
            documents(&self.messages)?,
        ])
    }
}

fn documents<E: Entity>(records: &[E]) -> Result<(EntityKind, Vec<Document>)> {
    let docs = records
        .iter()
        .map(Entity::to_document)
        .collect::<Result<Vec<_>>>()?;
    Ok((E::KIND, docs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_builtin_seed_parses() {
        let seed = SeedData::builtin().unwrap();
        assert_eq!(seed.users.len(), 3);
        assert_eq!(seed.subjects.len(), 6);
        assert_eq!(seed.record_count(), 41);

        let admin = &seed.users[0];
        assert_eq!(admin.id, "1");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(seed.students[0].full_name(), "Jean Martin");
    }

    #[test]
    fn test_collections_cover_every_record() {
        let seed = SeedData::builtin().unwrap();
        let collections = seed.collections().unwrap();
        let total: usize = collections.iter().map(|(_, docs)| docs.len()).sum();
        assert_eq!(total, seed.record_count());
        assert_eq!(collections[0].0, EntityKind::User);
    }

    #[test]
    fn test_unknown_collection_rejected() {
        assert!(SeedData::from_json(r#"{"spaceships": []}"#).is_err());
        assert_eq!(SeedData::from_json("{}").unwrap().record_count(), 0);
    }
}

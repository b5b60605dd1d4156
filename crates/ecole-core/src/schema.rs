//! Declarative per-kind schemas and the generic field mapper.
//!
//! Each [`EntitySchema`] lists every record field together with the column
//! it is stored under in the relational backend. Records use camelCase
//! field names; rows use snake_case column names. A single mapper
//! ([`EntitySchema::to_row`] / [`EntitySchema::from_row`]) translates both
//! ways for every kind.

use serde_json::Value;

use crate::entity::{Document, EntityKind};
use crate::error::{CoreError, Result};

/// A relational row keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Boolean,
    /// Arrays and nested records, stored as JSON text.
    Json,
}

impl ColumnType {
    /// SQL type used when creating the column.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Text | ColumnType::Json => "TEXT",
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
        }
    }
}

/// One record field and its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub column: &'static str,
    pub ty: ColumnType,
}

const fn text(field: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        column,
        ty: ColumnType::Text,
    }
}

const fn integer(field: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        column,
        ty: ColumnType::Integer,
    }
}

const fn real(field: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        column,
        ty: ColumnType::Real,
    }
}

const fn boolean(field: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        column,
        ty: ColumnType::Boolean,
    }
}

const fn json(field: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        column,
        ty: ColumnType::Json,
    }
}

/// Order in which the relational backend returns a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Most recently inserted first.
    Newest,
    Ascending(&'static str),
    Descending(&'static str),
}

/// The storage description of one entity kind.
#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub name: &'static str,
    /// Key of the collection in the local key-value substrate.
    pub storage_key: &'static str,
    /// Table in the relational backend.
    pub table: &'static str,
    pub order: OrderBy,
    /// Whether stored records accept updates.
    pub mutable: bool,
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    /// Look up a field by its record name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Look up a field by its column name.
    pub fn column(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.column == name)
    }

    /// Translate a record document into a row.
    ///
    /// Fails on any field the schema does not map, so a record can never
    /// lose data silently on its way to the relational backend.
    pub fn to_row(&self, doc: &Document) -> Result<Row> {
        let mut row = Row::new();
        for (field, value) in doc {
            let spec = self.field(field).ok_or_else(|| CoreError::UnknownField {
                kind: self.name,
                field: field.clone(),
            })?;
            row.insert(spec.column.to_string(), value.clone());
        }
        Ok(row)
    }

    /// Check that a full record has an id and only mapped fields.
    pub fn check_document(&self, doc: &Document) -> Result<()> {
        if crate::entity::document_id(doc).is_none() {
            return Err(CoreError::MissingId(self.name));
        }
        match doc.keys().find(|field| self.field(field).is_none()) {
            Some(field) => Err(CoreError::UnknownField {
                kind: self.name,
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Translate a row back into a record document.
    ///
    /// NULL columns are left out, and columns that are not part of the
    /// schema (bookkeeping such as insertion time) are ignored.
    pub fn from_row(&self, row: &Row) -> Document {
        let mut doc = Document::new();
        for spec in self.fields {
            match row.get(spec.column) {
                Some(Value::Null) | None => {}
                Some(value) => {
                    doc.insert(spec.field.to_string(), value.clone());
                }
            }
        }
        doc
    }

    /// Check that a patch only names known, changeable fields.
    pub fn check_patch(&self, patch: &Document) -> Result<()> {
        if !self.mutable {
            return Err(CoreError::ImmutableRecord(self.name));
        }
        for field in patch.keys() {
            if field == "id" {
                return Err(CoreError::ImmutableField {
                    kind: self.name,
                    field: field.clone(),
                });
            }
            if self.field(field).is_none() {
                return Err(CoreError::UnknownField {
                    kind: self.name,
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }

    /// Validate a patch and translate it into a partial row.
    pub fn patch_to_row(&self, patch: &Document) -> Result<Row> {
        self.check_patch(patch)?;
        self.to_row(patch)
    }
}

/// Look up the schema for a kind.
pub fn schema_for(kind: EntityKind) -> &'static EntitySchema {
    match kind {
        EntityKind::User => &USERS,
        EntityKind::Student => &STUDENTS,
        EntityKind::Class => &CLASSES,
        EntityKind::Subject => &SUBJECTS,
        EntityKind::Grade => &GRADES,
        EntityKind::Payment => &PAYMENTS,
        EntityKind::Staff => &STAFF,
        EntityKind::InventoryItem => &INVENTORY,
        EntityKind::News => &NEWS,
        EntityKind::Event => &EVENTS,
        EntityKind::Homework => &HOMEWORK,
        EntityKind::OnlineRegistration => &ONLINE_REGISTRATIONS,
        EntityKind::Room => &ROOMS,
        EntityKind::RoomSchedule => &ROOM_SCHEDULES,
        EntityKind::Attendance => &ATTENDANCE,
        EntityKind::Message => &MESSAGES,
        EntityKind::ParentNotification => &PARENT_NOTIFICATIONS,
        EntityKind::TeacherSalary => &TEACHER_SALARIES,
        EntityKind::TeacherAdvance => &TEACHER_ADVANCES,
        EntityKind::MonthlySalaryCost => &MONTHLY_SALARY_COSTS,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schemas
// ─────────────────────────────────────────────────────────────────────────────

static USERS: EntitySchema = EntitySchema {
    kind: EntityKind::User,
    name: "User",
    storage_key: "users",
    table: "users",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("username", "username"),
        text("password", "password"),
        text("role", "role"),
        text("name", "name"),
        text("email", "email"),
        text("phone", "phone"),
        text("profilePhoto", "profile_photo"),
        json("assignedClasses", "assigned_classes"),
        json("childrenIds", "children_ids"),
        json("permissions", "permissions"),
        boolean("isActive", "is_active"),
        text("createdAt", "created_at"),
    ],
};

static STUDENTS: EntitySchema = EntitySchema {
    kind: EntityKind::Student,
    name: "Student",
    storage_key: "students",
    table: "students",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("firstName", "first_name"),
        text("lastName", "last_name"),
        text("dateOfBirth", "date_of_birth"),
        text("gender", "gender"),
        text("classId", "class_id"),
        text("parentName", "parent_name"),
        text("parentPhone", "parent_phone"),
        text("parentEmail", "parent_email"),
        text("address", "address"),
        text("enrollmentDate", "enrollment_date"),
        text("profilePhoto", "profile_photo"),
        text("studentNumber", "student_number"),
        boolean("isActive", "is_active"),
        text("medicalInfo", "medical_info"),
    ],
};

static CLASSES: EntitySchema = EntitySchema {
    kind: EntityKind::Class,
    name: "Class",
    storage_key: "classes",
    table: "classes",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("name", "name"),
        text("level", "level"),
        text("teacherId", "teacher_id"),
        text("academicYear", "academic_year"),
        json("subjects", "subjects"),
        integer("maxStudents", "max_students"),
    ],
};

static SUBJECTS: EntitySchema = EntitySchema {
    kind: EntityKind::Subject,
    name: "Subject",
    storage_key: "subjects",
    table: "subjects",
    order: OrderBy::Ascending("name"),
    mutable: true,
    fields: &[
        text("id", "id"),
        text("name", "name"),
        text("code", "code"),
        integer("coefficient", "coefficient"),
        text("description", "description"),
    ],
};

static GRADES: EntitySchema = EntitySchema {
    kind: EntityKind::Grade,
    name: "Grade",
    storage_key: "grades",
    table: "grades",
    order: OrderBy::Descending("date"),
    mutable: true,
    fields: &[
        text("id", "id"),
        text("studentId", "student_id"),
        text("subjectId", "subject_id"),
        text("classId", "class_id"),
        real("value", "value"),
        real("maxValue", "max_value"),
        text("type", "type"),
        text("date", "date"),
        text("term", "term"),
        text("teacherId", "teacher_id"),
        text("comment", "comment"),
    ],
};

static PAYMENTS: EntitySchema = EntitySchema {
    kind: EntityKind::Payment,
    name: "Payment",
    storage_key: "payments",
    table: "payments",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("studentId", "student_id"),
        integer("amount", "amount"),
        text("type", "type"),
        text("description", "description"),
        text("date", "date"),
        text("method", "method"),
        text("status", "status"),
        text("receiptNumber", "receipt_number"),
        text("academicYear", "academic_year"),
        text("paidBy", "paid_by"),
    ],
};

static STAFF: EntitySchema = EntitySchema {
    kind: EntityKind::Staff,
    name: "Staff",
    storage_key: "staff",
    table: "staff",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("firstName", "first_name"),
        text("lastName", "last_name"),
        text("position", "position"),
        text("department", "department"),
        text("education", "education"),
        text("experience", "experience"),
        text("hireDate", "hire_date"),
        text("phone", "phone"),
        text("email", "email"),
        text("address", "address"),
        boolean("isActive", "is_active"),
        text("observations", "observations"),
        text("profilePhoto", "profile_photo"),
        json("documents", "documents"),
    ],
};

static INVENTORY: EntitySchema = EntitySchema {
    kind: EntityKind::InventoryItem,
    name: "InventoryItem",
    storage_key: "inventory",
    table: "inventory_items",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("name", "name"),
        text("category", "category"),
        integer("quantity", "quantity"),
        text("condition", "condition"),
        text("location", "location"),
        text("purchaseDate", "purchase_date"),
        integer("value", "value"),
        text("lastUpdated", "last_updated"),
        text("observations", "observations"),
    ],
};

static NEWS: EntitySchema = EntitySchema {
    kind: EntityKind::News,
    name: "News",
    storage_key: "news",
    table: "news",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("title", "title"),
        text("content", "content"),
        text("type", "type"),
        text("date", "date"),
        text("publishDate", "publish_date"),
        text("authorId", "author_id"),
        boolean("isPublished", "is_published"),
        text("priority", "priority"),
        text("imageUrl", "image_url"),
    ],
};

static EVENTS: EntitySchema = EntitySchema {
    kind: EntityKind::Event,
    name: "Event",
    storage_key: "events",
    table: "events",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("title", "title"),
        text("description", "description"),
        text("date", "date"),
        text("startTime", "start_time"),
        text("endTime", "end_time"),
        text("location", "location"),
        text("type", "type"),
        boolean("isPublic", "is_public"),
        text("createdBy", "created_by"),
    ],
};

static HOMEWORK: EntitySchema = EntitySchema {
    kind: EntityKind::Homework,
    name: "Homework",
    storage_key: "homework",
    table: "homework",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("title", "title"),
        text("description", "description"),
        text("subjectId", "subject_id"),
        text("classId", "class_id"),
        text("teacherId", "teacher_id"),
        text("dueDate", "due_date"),
        boolean("isPublished", "is_published"),
        text("createdAt", "created_at"),
        json("documents", "documents"),
    ],
};

static ONLINE_REGISTRATIONS: EntitySchema = EntitySchema {
    kind: EntityKind::OnlineRegistration,
    name: "OnlineRegistration",
    storage_key: "onlineRegistrations",
    table: "online_registrations",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("studentFirstName", "student_first_name"),
        text("studentLastName", "student_last_name"),
        text("dateOfBirth", "date_of_birth"),
        text("gender", "gender"),
        text("desiredLevel", "desired_level"),
        text("parentName", "parent_name"),
        text("parentPhone", "parent_phone"),
        text("parentEmail", "parent_email"),
        text("address", "address"),
        text("status", "status"),
        text("submittedAt", "submitted_at"),
        json("documents", "documents"),
        text("notes", "notes"),
    ],
};

static ROOMS: EntitySchema = EntitySchema {
    kind: EntityKind::Room,
    name: "Room",
    storage_key: "rooms",
    table: "rooms",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("name", "name"),
        integer("capacity", "capacity"),
        text("type", "type"),
        json("equipment", "equipment"),
        boolean("isAvailable", "is_available"),
    ],
};

static ROOM_SCHEDULES: EntitySchema = EntitySchema {
    kind: EntityKind::RoomSchedule,
    name: "RoomSchedule",
    storage_key: "roomSchedules",
    table: "room_schedules",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("roomId", "room_id"),
        text("classId", "class_id"),
        text("subjectId", "subject_id"),
        text("teacherId", "teacher_id"),
        text("day", "day"),
        text("startTime", "start_time"),
        text("endTime", "end_time"),
        text("academicYear", "academic_year"),
        json("documents", "documents"),
        text("notes", "notes"),
    ],
};

static ATTENDANCE: EntitySchema = EntitySchema {
    kind: EntityKind::Attendance,
    name: "Attendance",
    storage_key: "attendance",
    table: "attendance",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("studentId", "student_id"),
        text("classId", "class_id"),
        text("date", "date"),
        text("status", "status"),
        text("reason", "reason"),
        text("recordedBy", "recorded_by"),
    ],
};

static MESSAGES: EntitySchema = EntitySchema {
    kind: EntityKind::Message,
    name: "Message",
    storage_key: "messages",
    table: "messages",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("senderName", "sender_name"),
        text("senderEmail", "sender_email"),
        text("senderPhone", "sender_phone"),
        text("subject", "subject"),
        text("message", "message"),
        text("type", "type"),
        text("status", "status"),
        text("createdAt", "created_at"),
        text("priority", "priority"),
        text("recipientId", "recipient_id"),
        text("parentMessageId", "parent_message_id"),
        boolean("isFromAdmin", "is_from_admin"),
    ],
};

static PARENT_NOTIFICATIONS: EntitySchema = EntitySchema {
    kind: EntityKind::ParentNotification,
    name: "ParentNotification",
    storage_key: "parentNotifications",
    table: "parent_notifications",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("parentId", "parent_id"),
        text("messageId", "message_id"),
        text("title", "title"),
        text("content", "content"),
        text("type", "type"),
        boolean("isRead", "is_read"),
        text("createdAt", "created_at"),
    ],
};

static TEACHER_SALARIES: EntitySchema = EntitySchema {
    kind: EntityKind::TeacherSalary,
    name: "TeacherSalary",
    storage_key: "teacherSalaries",
    table: "teacher_salaries",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("teacherId", "teacher_id"),
        integer("baseSalary", "base_salary"),
        json("advances", "advances"),
        integer("bonuses", "bonuses"),
        integer("deductions", "deductions"),
        text("month", "month"),
        text("year", "year"),
        integer("totalPaid", "total_paid"),
        integer("remainingBalance", "remaining_balance"),
        text("status", "status"),
        text("notes", "notes"),
        text("finalizedAt", "finalized_at"),
    ],
};

static TEACHER_ADVANCES: EntitySchema = EntitySchema {
    kind: EntityKind::TeacherAdvance,
    name: "TeacherAdvance",
    storage_key: "teacherAdvances",
    table: "teacher_advances",
    order: OrderBy::Newest,
    mutable: false,
    fields: &[
        text("id", "id"),
        text("teacherId", "teacher_id"),
        integer("amount", "amount"),
        text("date", "date"),
        text("reason", "reason"),
        text("method", "method"),
        text("approvedBy", "approved_by"),
        text("receiptNumber", "receipt_number"),
        text("month", "month"),
        text("year", "year"),
    ],
};

static MONTHLY_SALARY_COSTS: EntitySchema = EntitySchema {
    kind: EntityKind::MonthlySalaryCost,
    name: "MonthlySalaryCost",
    storage_key: "monthlySalaryCosts",
    table: "monthly_salary_costs",
    order: OrderBy::Newest,
    mutable: true,
    fields: &[
        text("id", "id"),
        text("month", "month"),
        text("year", "year"),
        integer("totalBaseSalaries", "total_base_salaries"),
        integer("totalAdvances", "total_advances"),
        integer("totalBonuses", "total_bonuses"),
        integer("totalDeductions", "total_deductions"),
        integer("totalCost", "total_cost"),
        integer("teacherCount", "teacher_count"),
        text("generatedDate", "generated_date"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_to_row_translates_names() {
        let student = doc(json!({
            "id": "1",
            "firstName": "Jean",
            "classId": "1",
            "isActive": true,
        }));

        let row = STUDENTS.to_row(&student).unwrap();
        assert_eq!(row.get("first_name"), Some(&json!("Jean")));
        assert_eq!(row.get("class_id"), Some(&json!("1")));
        assert_eq!(row.get("is_active"), Some(&json!(true)));
        assert!(!row.contains_key("firstName"));
    }

    #[test]
    fn test_from_row_skips_nulls_and_bookkeeping() {
        let row = doc(json!({
            "id": "1",
            "first_name": "Jean",
            "medical_info": null,
            "inserted_at": 1700000000000i64,
        }));

        let record = STUDENTS.from_row(&row);
        assert_eq!(record.get("firstName"), Some(&json!("Jean")));
        assert!(!record.contains_key("medicalInfo"));
        assert!(!record.contains_key("inserted_at"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_unmapped_field_is_rejected() {
        let class = doc(json!({"id": "1", "colour": "blue"}));
        let err = CLASSES.to_row(&class).unwrap_err();
        assert!(matches!(err, CoreError::UnknownField { field, .. } if field == "colour"));
    }

    #[test]
    fn test_check_document() {
        assert!(SUBJECTS.check_document(&doc(json!({"id": "1", "name": "Anglais"}))).is_ok());
        assert!(matches!(
            SUBJECTS.check_document(&doc(json!({"name": "Anglais"}))),
            Err(CoreError::MissingId("Subject"))
        ));
    }

    #[test]
    fn test_patch_rules() {
        assert!(GRADES.check_patch(&doc(json!({"value": 12.5}))).is_ok());
        assert!(matches!(
            GRADES.check_patch(&doc(json!({"id": "9"}))),
            Err(CoreError::ImmutableField { .. })
        ));
        assert!(matches!(
            TEACHER_ADVANCES.check_patch(&doc(json!({"amount": 1}))),
            Err(CoreError::ImmutableRecord("TeacherAdvance"))
        ));
    }

    #[test]
    fn test_names_are_unique() {
        let mut keys = HashSet::new();
        let mut tables = HashSet::new();
        for kind in EntityKind::ALL {
            let schema = kind.schema();
            assert!(keys.insert(schema.storage_key), "duplicate key {}", schema.storage_key);
            assert!(tables.insert(schema.table), "duplicate table {}", schema.table);

            let mut columns = HashSet::new();
            for spec in schema.fields {
                assert!(columns.insert(spec.column), "{}.{}", schema.table, spec.column);
                assert!(!spec.column.chars().any(|c| c.is_ascii_uppercase()));
            }
        }
    }
}

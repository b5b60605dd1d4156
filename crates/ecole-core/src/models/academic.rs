//! Classes, subjects, grades, homework, rooms and attendance.

use serde::{Deserialize, Serialize};

use crate::types::RecordId;

/// A class (form group). Named `SchoolClass` to stay clear of the keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: RecordId,
    pub name: String,
    pub level: String,
    pub teacher_id: RecordId,
    pub academic_year: String,
    #[serde(default)]
    pub subjects: Vec<RecordId>,
    pub max_students: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: RecordId,
    pub name: String,
    pub code: String,
    pub coefficient: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeType {
    Devoir,
    Interrogation,
    Composition,
    Examen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: RecordId,
    pub student_id: RecordId,
    pub subject_id: RecordId,
    pub class_id: RecordId,
    pub value: f64,
    pub max_value: f64,
    #[serde(rename = "type")]
    pub grade_type: GradeType,
    pub date: String,
    pub term: String,
    pub teacher_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Grade {
    /// The grade scaled to a mark out of 20.
    pub fn out_of_twenty(&self) -> f64 {
        if self.max_value == 0.0 {
            0.0
        } else {
            self.value * 20.0 / self.max_value
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub subject_id: RecordId,
    pub class_id: RecordId,
    pub teacher_id: RecordId,
    pub due_date: String,
    pub is_published: bool,
    pub created_at: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Classroom,
    Lab,
    Library,
    Gym,
    Office,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RecordId,
    pub name: String,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub is_available: bool,
}

/// A weekly timetable slot in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSchedule {
    pub id: RecordId,
    pub room_id: RecordId,
    pub class_id: RecordId,
    pub subject_id: RecordId,
    pub teacher_id: RecordId,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub academic_year: String,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: RecordId,
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub date: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub recorded_by: RecordId,
}

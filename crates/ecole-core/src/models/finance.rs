//! Fees, inventory and teacher payroll records.

use serde::{Deserialize, Serialize};

use crate::payroll::SalaryStatus;
use crate::types::{Amount, Month, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Inscription,
    Scolarite,
    Cantine,
    Transport,
    Fournitures,
    Autre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Especes,
    Mobile,
    Cheque,
    Virement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A fee payment made for a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: RecordId,
    pub student_id: RecordId,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub description: String,
    pub date: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub receipt_number: String,
    pub academic_year: String,
    pub paid_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    Excellent,
    Bon,
    Moyen,
    Mauvais,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub condition: ItemCondition,
    pub location: String,
    pub purchase_date: String,
    pub value: Amount,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

/// An advance paid to a teacher against a month's salary.
///
/// Advances are never modified once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAdvance {
    pub id: RecordId,
    pub teacher_id: RecordId,
    pub amount: Amount,
    pub date: String,
    pub reason: String,
    pub method: PaymentMethod,
    pub approved_by: RecordId,
    pub receipt_number: String,
    pub month: Month,
    pub year: String,
}

/// A teacher's reconciled salary for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSalary {
    pub id: RecordId,
    pub teacher_id: RecordId,
    pub base_salary: Amount,
    /// The advances that were counted when this salary was computed.
    #[serde(default)]
    pub advances: Vec<TeacherAdvance>,
    pub bonuses: Amount,
    pub deductions: Amount,
    pub month: Month,
    pub year: String,
    pub total_paid: Amount,
    pub remaining_balance: Amount,
    pub status: SalaryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<String>,
}

impl TeacherSalary {
    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }
}

/// Payroll totals for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalaryCost {
    pub id: RecordId,
    pub month: Month,
    pub year: String,
    pub total_base_salaries: Amount,
    pub total_advances: Amount,
    pub total_bonuses: Amount,
    pub total_deductions: Amount,
    pub total_cost: Amount,
    pub teacher_count: u32,
    pub generated_date: String,
}

//! Salary reconciliation for teachers.
//!
//! A month's salary is reconciled against the advances already paid for
//! that month:
//!
//! ```text
//! totalAdvances    = Σ advance.amount
//! totalPaid        = totalAdvances + bonuses
//! remainingBalance = baseSalary - totalPaid - deductions
//! ```
//!
//! Deductions reduce the remaining balance but are not counted as paid, so a
//! salary whose deductions cover the base amount reads `completed` even when
//! nothing has been paid out.

use serde::{Deserialize, Serialize};

use crate::error::PayrollError;
use crate::models::{MonthlySalaryCost, TeacherAdvance, TeacherSalary};
use crate::types::{Amount, Month, RecordId};

/// Payment status of a teacher's monthly salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryStatus {
    Pending,
    Partial,
    Completed,
}

impl SalaryStatus {
    /// Derive the status from the reconciled totals.
    pub fn derive(remaining_balance: Amount, total_paid: Amount) -> Self {
        if remaining_balance <= 0 {
            SalaryStatus::Completed
        } else if total_paid > 0 {
            SalaryStatus::Partial
        } else {
            SalaryStatus::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SalaryStatus::Pending => "pending",
            SalaryStatus::Partial => "partial",
            SalaryStatus::Completed => "completed",
        }
    }
}

/// The amounts a salary is computed from, before advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalaryInputs {
    pub base_salary: Amount,
    pub bonuses: Amount,
    pub deductions: Amount,
}

impl SalaryInputs {
    pub fn new(base_salary: Amount) -> Self {
        Self {
            base_salary,
            bonuses: 0,
            deductions: 0,
        }
    }

    pub fn with_bonuses(mut self, bonuses: Amount) -> Self {
        self.bonuses = bonuses;
        self
    }

    pub fn with_deductions(mut self, deductions: Amount) -> Self {
        self.deductions = deductions;
        self
    }

    /// Reject negative amounts.
    pub fn validate(&self) -> Result<(), PayrollError> {
        non_negative("baseSalary", self.base_salary)?;
        non_negative("bonuses", self.bonuses)?;
        non_negative("deductions", self.deductions)?;
        Ok(())
    }
}

/// Result of reconciling one salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub total_advances: Amount,
    pub total_paid: Amount,
    pub remaining_balance: Amount,
    pub status: SalaryStatus,
}

/// Reconcile a salary against the advances paid for the same teacher and
/// month. The caller is responsible for passing only matching advances.
pub fn reconcile(
    inputs: &SalaryInputs,
    advances: &[TeacherAdvance],
) -> Result<Reconciliation, PayrollError> {
    inputs.validate()?;

    let total_advances = sum(advances.iter().map(|a| a.amount), "advance")?;
    let total_paid = total_advances
        .checked_add(inputs.bonuses)
        .ok_or(PayrollError::Overflow)?;
    let remaining_balance = inputs
        .base_salary
        .checked_sub(total_paid)
        .and_then(|r| r.checked_sub(inputs.deductions))
        .ok_or(PayrollError::Overflow)?;

    Ok(Reconciliation {
        total_advances,
        total_paid,
        remaining_balance,
        status: SalaryStatus::derive(remaining_balance, total_paid),
    })
}

/// Select the advances recorded for a teacher in a month.
pub fn matching_advances(
    advances: &[TeacherAdvance],
    teacher_id: &RecordId,
    month: &Month,
) -> Vec<TeacherAdvance> {
    advances
        .iter()
        .filter(|a| &a.teacher_id == teacher_id && &a.month == month)
        .cloned()
        .collect()
}

/// Inputs for a new salary record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRequest {
    pub teacher_id: RecordId,
    pub month: Month,
    pub inputs: SalaryInputs,
    pub notes: Option<String>,
}

/// Build a salary record from the request and the teacher's advances for the
/// month. `advances` may contain unrelated records; they are filtered here.
pub fn build_salary(
    id: RecordId,
    request: &SalaryRequest,
    advances: &[TeacherAdvance],
) -> Result<TeacherSalary, PayrollError> {
    let matching = matching_advances(advances, &request.teacher_id, &request.month);
    let totals = reconcile(&request.inputs, &matching)?;

    Ok(TeacherSalary {
        id,
        teacher_id: request.teacher_id.clone(),
        base_salary: request.inputs.base_salary,
        advances: matching,
        bonuses: request.inputs.bonuses,
        deductions: request.inputs.deductions,
        year: request.month.year().to_string(),
        month: request.month.clone(),
        total_paid: totals.total_paid,
        remaining_balance: totals.remaining_balance,
        status: totals.status,
        notes: request.notes.clone(),
        finalized_at: None,
    })
}

/// Re-derive an existing salary from the current advances.
///
/// Fails if the salary has been finalized.
pub fn recompute(
    salary: &TeacherSalary,
    advances: &[TeacherAdvance],
) -> Result<TeacherSalary, PayrollError> {
    if salary.is_finalized() {
        return Err(PayrollError::Finalized(salary.id.clone()));
    }

    let request = SalaryRequest {
        teacher_id: salary.teacher_id.clone(),
        month: salary.month.clone(),
        inputs: SalaryInputs {
            base_salary: salary.base_salary,
            bonuses: salary.bonuses,
            deductions: salary.deductions,
        },
        notes: salary.notes.clone(),
    };
    build_salary(salary.id.clone(), &request, advances)
}

/// Reduce a month's salaries and advances into a cost record.
///
/// Advances are reported but excluded from `totalCost`: they are drawn
/// against base salaries, not paid on top of them.
pub fn monthly_cost(
    id: RecordId,
    month: &Month,
    salaries: &[TeacherSalary],
    advances: &[TeacherAdvance],
    generated_date: String,
) -> Result<MonthlySalaryCost, PayrollError> {
    let salaries: Vec<&TeacherSalary> = salaries.iter().filter(|s| &s.month == month).collect();

    let total_base_salaries = sum(salaries.iter().map(|s| s.base_salary), "baseSalary")?;
    let total_bonuses = sum(salaries.iter().map(|s| s.bonuses), "bonuses")?;
    let total_deductions = sum(salaries.iter().map(|s| s.deductions), "deductions")?;
    let total_advances = sum(
        advances
            .iter()
            .filter(|a| &a.month == month)
            .map(|a| a.amount),
        "advance",
    )?;
    let total_cost = total_base_salaries
        .checked_add(total_bonuses)
        .and_then(|c| c.checked_sub(total_deductions))
        .ok_or(PayrollError::Overflow)?;

    Ok(MonthlySalaryCost {
        id,
        year: month.year().to_string(),
        month: month.clone(),
        total_base_salaries,
        total_advances,
        total_bonuses,
        total_deductions,
        total_cost,
        teacher_count: u32::try_from(salaries.len()).map_err(|_| PayrollError::Overflow)?,
        generated_date,
    })
}

fn non_negative(field: &'static str, amount: Amount) -> Result<(), PayrollError> {
    if amount < 0 {
        Err(PayrollError::NegativeAmount { field, amount })
    } else {
        Ok(())
    }
}

fn sum(
    amounts: impl Iterator<Item = Amount>,
    field: &'static str,
) -> Result<Amount, PayrollError> {
    amounts.into_iter().try_fold(0 as Amount, |acc, amount| {
        non_negative(field, amount)?;
        acc.checked_add(amount).ok_or(PayrollError::Overflow)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use proptest::prelude::*;

    fn advance(teacher: &str, month: &str, amount: Amount) -> TeacherAdvance {
        let month = Month::parse(month).unwrap();
        TeacherAdvance {
            id: RecordId::generate(),
            teacher_id: RecordId::from(teacher),
            amount,
            date: "2024-10-05".to_string(),
            reason: "avance".to_string(),
            method: PaymentMethod::Especes,
            approved_by: RecordId::from("1"),
            receipt_number: "ADV1".to_string(),
            year: month.year().to_string(),
            month,
        }
    }

    fn advances_of(amounts: &[Amount]) -> Vec<TeacherAdvance> {
        amounts.iter().map(|&a| advance("2", "2024-10", a)).collect()
    }

    #[test]
    fn test_partial_payment() {
        let inputs = SalaryInputs::new(300_000)
            .with_bonuses(20_000)
            .with_deductions(10_000);
        let r = reconcile(&inputs, &advances_of(&[50_000, 50_000])).unwrap();

        assert_eq!(r.total_advances, 100_000);
        assert_eq!(r.total_paid, 120_000);
        assert_eq!(r.remaining_balance, 170_000);
        assert_eq!(r.status, SalaryStatus::Partial);
    }

    #[test]
    fn test_nothing_paid_is_pending() {
        let r = reconcile(&SalaryInputs::new(100_000), &[]).unwrap();
        assert_eq!(r.remaining_balance, 100_000);
        assert_eq!(r.status, SalaryStatus::Pending);
    }

    #[test]
    fn test_fully_advanced_is_completed() {
        let r = reconcile(&SalaryInputs::new(100_000), &advances_of(&[100_000])).unwrap();
        assert_eq!(r.remaining_balance, 0);
        assert_eq!(r.status, SalaryStatus::Completed);
    }

    #[test]
    fn test_deductions_alone_complete_salary() {
        let inputs = SalaryInputs::new(50_000).with_deductions(60_000);
        let r = reconcile(&inputs, &[]).unwrap();
        assert_eq!(r.total_paid, 0);
        assert_eq!(r.remaining_balance, -10_000);
        assert_eq!(r.status, SalaryStatus::Completed);
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let inputs = SalaryInputs::new(100_000).with_bonuses(-1);
        assert_eq!(
            reconcile(&inputs, &[]),
            Err(PayrollError::NegativeAmount {
                field: "bonuses",
                amount: -1
            })
        );
    }

    #[test]
    fn test_build_salary_filters_advances() {
        let advances = vec![
            advance("2", "2024-10", 40_000),
            advance("2", "2024-09", 10_000),
            advance("7", "2024-10", 25_000),
        ];
        let request = SalaryRequest {
            teacher_id: RecordId::from("2"),
            month: Month::parse("2024-10").unwrap(),
            inputs: SalaryInputs::new(150_000),
            notes: None,
        };

        let salary = build_salary(RecordId::from("s1"), &request, &advances).unwrap();
        assert_eq!(salary.advances.len(), 1);
        assert_eq!(salary.total_paid, 40_000);
        assert_eq!(salary.remaining_balance, 110_000);
        assert_eq!(salary.year, "2024");
        assert_eq!(salary.status, SalaryStatus::Partial);
    }

    #[test]
    fn test_recompute_refuses_finalized() {
        let request = SalaryRequest {
            teacher_id: RecordId::from("2"),
            month: Month::parse("2024-10").unwrap(),
            inputs: SalaryInputs::new(100_000),
            notes: None,
        };
        let mut salary = build_salary(RecordId::from("s1"), &request, &[]).unwrap();
        salary.finalized_at = Some("2024-10-31T18:00:00Z".to_string());

        assert_eq!(
            recompute(&salary, &[]),
            Err(PayrollError::Finalized(RecordId::from("s1")))
        );
    }

    #[test]
    fn test_monthly_cost_excludes_advances() {
        let month = Month::parse("2024-10").unwrap();
        let request = |teacher: &str, base, bonus, deduction| SalaryRequest {
            teacher_id: RecordId::from(teacher),
            month: month.clone(),
            inputs: SalaryInputs::new(base)
                .with_bonuses(bonus)
                .with_deductions(deduction),
            notes: None,
        };
        let advances = vec![advance("2", "2024-10", 50_000), advance("3", "2024-09", 5_000)];
        let salaries = vec![
            build_salary(RecordId::from("a"), &request("2", 300_000, 20_000, 10_000), &advances)
                .unwrap(),
            build_salary(RecordId::from("b"), &request("3", 200_000, 0, 5_000), &advances).unwrap(),
        ];

        let cost = monthly_cost(
            RecordId::from("c"),
            &month,
            &salaries,
            &advances,
            "2024-10-31T00:00:00Z".to_string(),
        )
        .unwrap();

        assert_eq!(cost.total_base_salaries, 500_000);
        assert_eq!(cost.total_advances, 50_000);
        assert_eq!(cost.total_bonuses, 20_000);
        assert_eq!(cost.total_deductions, 15_000);
        assert_eq!(cost.total_cost, 505_000);
        assert_eq!(cost.teacher_count, 2);
    }

    proptest! {
        #[test]
        fn remaining_balance_identity(
            base in 0i64..10_000_000,
            bonuses in 0i64..1_000_000,
            deductions in 0i64..1_000_000,
            amounts in prop::collection::vec(0i64..1_000_000, 0..8),
        ) {
            let inputs = SalaryInputs::new(base).with_bonuses(bonuses).with_deductions(deductions);
            let r = reconcile(&inputs, &advances_of(&amounts)).unwrap();
            let advanced: i64 = amounts.iter().sum();

            prop_assert_eq!(r.remaining_balance, base - (advanced + bonuses) - deductions);
            prop_assert_eq!(r.total_paid, advanced + bonuses);
        }

        #[test]
        fn status_rules(
            base in 0i64..10_000_000,
            bonuses in 0i64..1_000_000,
            deductions in 0i64..1_000_000,
            amounts in prop::collection::vec(0i64..1_000_000, 0..8),
        ) {
            let inputs = SalaryInputs::new(base).with_bonuses(bonuses).with_deductions(deductions);
            let r = reconcile(&inputs, &advances_of(&amounts)).unwrap();

            if r.remaining_balance <= 0 {
                prop_assert_eq!(r.status, SalaryStatus::Completed);
            } else if r.total_paid == 0 {
                prop_assert_eq!(r.status, SalaryStatus::Pending);
            } else {
                prop_assert_eq!(r.status, SalaryStatus::Partial);
            }
        }
    }
}

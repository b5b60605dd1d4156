//! Golden payroll vectors.
//!
//! Worked reconciliation examples with their expected results. Every
//! backend and every layer that computes salaries must reproduce them.

use ecole_core::payroll::{reconcile, Reconciliation};
use ecole_core::{Amount, PayrollError, SalaryInputs, SalaryStatus, TeacherAdvance};

use crate::fixtures;

/// A golden payroll vector.
#[derive(Debug, Clone)]
pub struct PayrollVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub base_salary: Amount,
    pub advances: &'static [Amount],
    pub bonuses: Amount,
    pub deductions: Amount,
    pub expected_total_paid: Amount,
    pub expected_remaining_balance: Amount,
    pub expected_status: SalaryStatus,
}

impl PayrollVector {
    pub fn inputs(&self) -> SalaryInputs {
        SalaryInputs::new(self.base_salary)
            .with_bonuses(self.bonuses)
            .with_deductions(self.deductions)
    }

    /// The vector's advances as records for teacher `t1` in March 2024.
    pub fn advance_records(&self) -> Vec<TeacherAdvance> {
        self.advances
            .iter()
            .enumerate()
            .map(|(i, amount)| fixtures::advance(&format!("gv{}", i), "t1", "2024-03", *amount))
            .collect()
    }

    /// Reconcile the vector's inputs.
    pub fn reconcile(&self) -> Result<Reconciliation, PayrollError> {
        reconcile(&self.inputs(), &self.advance_records())
    }
}

/// Get all golden payroll vectors.
pub fn all_vectors() -> Vec<PayrollVector> {
    vec![
        PayrollVector {
            name: "two advances with bonus and deduction",
            base_salary: 300_000,
            advances: &[50_000, 50_000],
            bonuses: 20_000,
            deductions: 10_000,
            expected_total_paid: 120_000,
            expected_remaining_balance: 170_000,
            expected_status: SalaryStatus::Partial,
        },
        PayrollVector {
            name: "nothing paid yet",
            base_salary: 100_000,
            advances: &[],
            bonuses: 0,
            deductions: 0,
            expected_total_paid: 0,
            expected_remaining_balance: 100_000,
            expected_status: SalaryStatus::Pending,
        },
        PayrollVector {
            name: "advance covers the salary",
            base_salary: 100_000,
            advances: &[100_000],
            bonuses: 0,
            deductions: 0,
            expected_total_paid: 100_000,
            expected_remaining_balance: 0,
            expected_status: SalaryStatus::Completed,
        },
        PayrollVector {
            name: "deductions alone complete the salary",
            base_salary: 50_000,
            advances: &[],
            bonuses: 0,
            deductions: 60_000,
            expected_total_paid: 0,
            expected_remaining_balance: -10_000,
            expected_status: SalaryStatus::Completed,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors() {
        for vector in all_vectors() {
            let r = vector.reconcile().unwrap();
            assert_eq!(r.total_paid, vector.expected_total_paid, "{}", vector.name);
            assert_eq!(
                r.remaining_balance, vector.expected_remaining_balance,
                "{}",
                vector.name
            );
            assert_eq!(r.status, vector.expected_status, "{}", vector.name);
        }
    }
}

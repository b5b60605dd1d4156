//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ecole_core::{Amount, Month, RecordId, SalaryInputs, TeacherAdvance};

use crate::fixtures;

/// Largest generated amount. Sums of many amounts stay far from overflow.
pub const MAX_AMOUNT: Amount = 1_000_000_000;

/// A non-negative amount.
pub fn amount() -> impl Strategy<Value = Amount> {
    0..=MAX_AMOUNT
}

/// A strictly positive amount, as advances require.
pub fn positive_amount() -> impl Strategy<Value = Amount> {
    1..=MAX_AMOUNT
}

/// A valid `YYYY-MM` month.
pub fn month() -> impl Strategy<Value = Month> {
    (2000u32..=2099, 1u32..=12).prop_map(|(y, m)| fixtures::month(&format!("{:04}-{:02}", y, m)))
}

/// A short numeric record id.
pub fn record_id() -> impl Strategy<Value = RecordId> {
    "[1-9][0-9]{0,12}".prop_map(RecordId::new)
}

/// Salary inputs with non-negative amounts.
pub fn salary_inputs() -> impl Strategy<Value = SalaryInputs> {
    (amount(), amount(), amount()).prop_map(|(base, bonuses, deductions)| {
        SalaryInputs::new(base)
            .with_bonuses(bonuses)
            .with_deductions(deductions)
    })
}

/// Up to `max` advances for one teacher and month.
pub fn advances_for(
    teacher_id: &'static str,
    month: &'static str,
    max: usize,
) -> impl Strategy<Value = Vec<TeacherAdvance>> {
    prop::collection::vec(positive_amount(), 0..=max).prop_map(move |amounts| {
        amounts
            .into_iter()
            .enumerate()
            .map(|(i, amount)| fixtures::advance(&format!("adv{}", i), teacher_id, month, amount))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecole_core::payroll::reconcile;
    use ecole_core::SalaryStatus;

    proptest! {
        #[test]
        fn test_reconciliation_identity(
            inputs in salary_inputs(),
            advances in advances_for("t1", "2024-03", 8),
        ) {
            let r = reconcile(&inputs, &advances).unwrap();
            let sum: Amount = advances.iter().map(|a| a.amount).sum();
            prop_assert_eq!(
                r.remaining_balance,
                inputs.base_salary - (sum + inputs.bonuses) - inputs.deductions
            );
            if r.remaining_balance <= 0 {
                prop_assert_eq!(r.status, SalaryStatus::Completed);
            } else if r.total_paid == 0 {
                prop_assert_eq!(r.status, SalaryStatus::Pending);
            }
        }

        #[test]
        fn test_generated_months_are_valid(m in month()) {
            prop_assert!(Month::parse(m.as_str()).is_ok());
        }
    }
}

//! Payroll operations over the record store.
//!
//! The arithmetic lives in [`ecole_core::payroll`]; this service reads the
//! records it needs through the store and writes the results back.
//! Computing, recomputing and finalizing a salary for one teacher and month
//! run under a per-(teacher, month) lock, so a finalization never races a
//! recomputation of the same salary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use ecole_core::payroll::{self, SalaryRequest};
use ecole_core::types::{now_millis, now_rfc3339, today};
use ecole_core::{
    Amount, MonthlySalaryCost, Month, Patch, PaymentMethod, PayrollError, RecordId, TeacherAdvance,
    TeacherSalary,
};
use ecole_store::{RecordStore, RecordStoreExt};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::{Result, SchoolError};

/// Inputs for recording an advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceRequest {
    pub teacher_id: RecordId,
    pub amount: Amount,
    pub reason: String,
    pub method: PaymentMethod,
    pub approved_by: RecordId,
    pub month: Month,
    /// Payment date (`YYYY-MM-DD`). Defaults to today.
    pub date: Option<String>,
}

type LockKey = (RecordId, Month);
type LockMap = Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>;

/// Exclusive hold on one teacher's salary for one month.
///
/// Dropping it releases the lock and evicts the map entry once nobody else
/// holds or waits on it.
struct SalaryLock<'a> {
    locks: &'a LockMap,
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SalaryLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.key);
        }
    }
}

/// Payroll service.
pub struct PayrollService<S: RecordStore + ?Sized> {
    store: Arc<S>,
    locks: LockMap,
}

impl<S: RecordStore + ?Sized> PayrollService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for the lock guarding one teacher's salary for one month.
    async fn lock_salary(&self, teacher_id: &RecordId, month: &Month) -> SalaryLock<'_> {
        let key = (teacher_id.clone(), month.clone());
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        let guard = lock.lock_owned().await;
        SalaryLock {
            locks: &self.locks,
            key,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Advances
    // ─────────────────────────────────────────────────────────────────────────

    /// Record an advance paid to a teacher.
    pub async fn record_advance(&self, request: AdvanceRequest) -> Result<TeacherAdvance> {
        if request.amount <= 0 {
            return Err(PayrollError::InvalidAdvance(request.amount).into());
        }

        let advance = TeacherAdvance {
            id: RecordId::generate(),
            teacher_id: request.teacher_id,
            amount: request.amount,
            date: request.date.unwrap_or_else(today),
            reason: request.reason,
            method: request.method,
            approved_by: request.approved_by,
            receipt_number: format!("ADV{}", now_millis()),
            year: request.month.year().to_string(),
            month: request.month,
        };

        self.store.add_record(&advance).await?;
        tracing::debug!(
            teacher = %advance.teacher_id,
            month = %advance.month,
            amount = advance.amount,
            "advance recorded"
        );
        Ok(advance)
    }

    /// Advances recorded for a teacher in a month.
    pub async fn advances_for(&self, teacher_id: &RecordId, month: &Month) -> Result<Vec<TeacherAdvance>> {
        let advances = self.store.list_records::<TeacherAdvance>().await?;
        Ok(payroll::matching_advances(&advances, teacher_id, month))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Salaries
    // ─────────────────────────────────────────────────────────────────────────

    /// Reconcile and store a new salary.
    pub async fn compute_salary(&self, request: SalaryRequest) -> Result<TeacherSalary> {
        let _lock = self.lock_salary(&request.teacher_id, &request.month).await;

        let advances = self.advances_for(&request.teacher_id, &request.month).await?;
        let salary = payroll::build_salary(RecordId::generate(), &request, &advances)?;
        self.store.add_record(&salary).await?;

        tracing::debug!(
            id = %salary.id,
            teacher = %salary.teacher_id,
            month = %salary.month,
            remaining = salary.remaining_balance,
            status = salary.status.as_str(),
            "salary computed"
        );
        Ok(salary)
    }

    /// Re-derive a stored salary from the current advances.
    pub async fn recompute_salary(&self, id: &RecordId) -> Result<TeacherSalary> {
        self.rederive(id, false).await
    }

    /// Recompute a salary one last time and lock it against further changes.
    pub async fn finalize_salary(&self, id: &RecordId) -> Result<TeacherSalary> {
        self.rederive(id, true).await
    }

    async fn rederive(&self, id: &RecordId, finalize: bool) -> Result<TeacherSalary> {
        let stored = self.require_salary(id).await?;
        let _lock = self.lock_salary(&stored.teacher_id, &stored.month).await;

        // Re-read under the lock: a concurrent finalization may have won.
        let stored = self.require_salary(id).await?;
        let advances = self.advances_for(&stored.teacher_id, &stored.month).await?;
        let mut salary = payroll::recompute(&stored, &advances)?;

        let mut patch = Patch::<TeacherSalary>::new()
            .set_serialized("advances", &salary.advances)?
            .set("totalPaid", salary.total_paid)
            .set("remainingBalance", salary.remaining_balance)
            .set("status", salary.status.as_str());
        if finalize {
            let finalized_at = now_rfc3339();
            patch = patch.set("finalizedAt", finalized_at.as_str());
            salary.finalized_at = Some(finalized_at);
        }
        self.store.update_record(id, patch).await?;

        tracing::debug!(
            id = %salary.id,
            status = salary.status.as_str(),
            finalized = finalize,
            "salary recomputed"
        );
        Ok(salary)
    }

    async fn require_salary(&self, id: &RecordId) -> Result<TeacherSalary> {
        self.store
            .find_record::<TeacherSalary>(id)
            .await?
            .ok_or_else(|| SchoolError::NotFound {
                kind: ecole_core::EntityKind::TeacherSalary,
                id: id.clone(),
            })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Monthly cost
    // ─────────────────────────────────────────────────────────────────────────

    /// Aggregate a month's payroll, replacing any earlier aggregate.
    pub async fn generate_monthly_cost(&self, month: &Month) -> Result<MonthlySalaryCost> {
        let salaries = self.store.list_records::<TeacherSalary>().await?;
        let advances = self.store.list_records::<TeacherAdvance>().await?;
        let cost = payroll::monthly_cost(RecordId::generate(), month, &salaries, &advances, today())?;

        let previous = self.store.list_records::<MonthlySalaryCost>().await?;
        for stale in previous.iter().filter(|c| &c.month == month) {
            self.store.delete_record::<MonthlySalaryCost>(&stale.id).await?;
        }
        self.store.add_record(&cost).await?;

        tracing::debug!(
            month = %month,
            teachers = cost.teacher_count,
            total = cost.total_cost,
            "monthly salary cost generated"
        );
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecole_core::{SalaryInputs, SalaryStatus};
    use ecole_store::{LocalStore, MemoryKv};

    fn service() -> PayrollService<LocalStore<MemoryKv>> {
        PayrollService::new(Arc::new(LocalStore::new(MemoryKv::new())))
    }

    fn month() -> Month {
        Month::parse("2024-03").unwrap()
    }

    fn advance(teacher: &str, amount: Amount) -> AdvanceRequest {
        AdvanceRequest {
            teacher_id: RecordId::new(teacher),
            amount,
            reason: "Avance".to_string(),
            method: PaymentMethod::Especes,
            approved_by: RecordId::new("1"),
            month: month(),
            date: Some("2024-03-05".to_string()),
        }
    }

    #[tokio::test]
    async fn test_record_advance() {
        let service = service();
        let recorded = service.record_advance(advance("t1", 20_000)).await.unwrap();
        assert!(recorded.receipt_number.starts_with("ADV"));
        assert_eq!(recorded.year, "2024");
        assert_eq!(recorded.date, "2024-03-05");

        let err = service.record_advance(advance("t1", 0)).await.unwrap_err();
        assert!(matches!(err, SchoolError::Payroll(PayrollError::InvalidAdvance(0))));
    }

    #[tokio::test]
    async fn test_compute_uses_only_matching_advances() {
        let service = service();
        service.record_advance(advance("t1", 50_000)).await.unwrap();
        service.record_advance(advance("t2", 70_000)).await.unwrap();

        let salary = service
            .compute_salary(SalaryRequest {
                teacher_id: RecordId::new("t1"),
                month: month(),
                inputs: SalaryInputs::new(200_000),
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(salary.advances.len(), 1);
        assert_eq!(salary.total_paid, 50_000);
        assert_eq!(salary.remaining_balance, 150_000);
        assert_eq!(salary.status, SalaryStatus::Partial);
    }

    #[tokio::test]
    async fn test_salary_locks_are_released() {
        let service = service();
        service.record_advance(advance("t1", 10_000)).await.unwrap();
        let salary = service
            .compute_salary(SalaryRequest {
                teacher_id: RecordId::new("t1"),
                month: month(),
                inputs: SalaryInputs::new(80_000),
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(service.held_locks(), 0);

        let (a, b) = tokio::join!(
            service.recompute_salary(&salary.id),
            service.finalize_salary(&salary.id)
        );
        assert!(a.is_ok() || b.is_ok());
        assert_eq!(service.held_locks(), 0);
    }

    #[tokio::test]
    async fn test_missing_salary() {
        let err = service().recompute_salary(&RecordId::new("nope")).await.unwrap_err();
        assert!(matches!(err, SchoolError::NotFound { .. }));
    }
}

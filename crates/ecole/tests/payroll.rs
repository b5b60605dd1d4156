//! Payroll workflow through the facade.

use ecole::core::payroll::SalaryRequest;
use ecole::core::{
    MonthlySalaryCost, Patch, PaymentMethod, PayrollError, SalaryInputs, SalaryStatus,
    TeacherSalary,
};
use ecole::{AdvanceRequest, RecordStore, SchoolDb, SchoolError};
use ecole_testkit::fixtures::{id, local_db, month, sqlite_db};
use ecole_testkit::vectors::all_vectors;

fn advance_request(teacher: &str, month_str: &str, amount: i64) -> AdvanceRequest {
    AdvanceRequest {
        teacher_id: id(teacher),
        amount,
        reason: "Avance".to_string(),
        method: PaymentMethod::Mobile,
        approved_by: id("1"),
        month: month(month_str),
        date: None,
    }
}

fn salary_request(teacher: &str, month_str: &str, inputs: SalaryInputs) -> SalaryRequest {
    SalaryRequest {
        teacher_id: id(teacher),
        month: month(month_str),
        inputs,
        notes: None,
    }
}

async fn assert_golden_vectors<S: RecordStore + ?Sized>(db: &SchoolDb<S>) {
    for (i, vector) in all_vectors().into_iter().enumerate() {
        let teacher = format!("t{}", i);
        for amount in vector.advances {
            db.payroll()
                .record_advance(advance_request(&teacher, "2024-03", *amount))
                .await
                .unwrap();
        }

        let salary = db
            .payroll()
            .compute_salary(salary_request(&teacher, "2024-03", vector.inputs()))
            .await
            .unwrap();
        assert_eq!(salary.total_paid, vector.expected_total_paid, "{}", vector.name);
        assert_eq!(
            salary.remaining_balance, vector.expected_remaining_balance,
            "{}",
            vector.name
        );
        assert_eq!(salary.status, vector.expected_status, "{}", vector.name);
        assert_eq!(salary.advances.len(), vector.advances.len());

        let stored: TeacherSalary = db.require(&salary.id).await.unwrap();
        assert_eq!(stored, salary);
    }
}

#[tokio::test]
async fn test_golden_vectors_local() {
    assert_golden_vectors(&local_db()).await;
}

#[tokio::test]
async fn test_golden_vectors_sqlite() {
    assert_golden_vectors(&sqlite_db()).await;
}

#[tokio::test]
async fn test_negative_inputs_rejected() {
    let db = local_db();
    let err = db
        .payroll()
        .compute_salary(salary_request("t1", "2024-03", SalaryInputs::new(-1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchoolError::Payroll(PayrollError::NegativeAmount { field: "baseSalary", amount: -1 })
    ));
    assert!(db.list::<TeacherSalary>().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recompute_picks_up_new_advances() {
    let db = sqlite_db();
    let payroll = db.payroll();

    let salary = payroll
        .compute_salary(salary_request("t1", "2024-04", SalaryInputs::new(100_000)))
        .await
        .unwrap();
    assert_eq!(salary.status, SalaryStatus::Pending);

    payroll
        .record_advance(advance_request("t1", "2024-04", 40_000))
        .await
        .unwrap();
    payroll
        .record_advance(advance_request("t1", "2024-05", 99_000))
        .await
        .unwrap();

    let recomputed = payroll.recompute_salary(&salary.id).await.unwrap();
    assert_eq!(recomputed.total_paid, 40_000);
    assert_eq!(recomputed.remaining_balance, 60_000);
    assert_eq!(recomputed.status, SalaryStatus::Partial);

    let stored: TeacherSalary = db.require(&salary.id).await.unwrap();
    assert_eq!(stored, recomputed);
}

#[tokio::test]
async fn test_finalized_salary_is_locked() {
    let db = local_db();
    let payroll = db.payroll();

    payroll
        .record_advance(advance_request("t1", "2024-03", 100_000))
        .await
        .unwrap();
    let salary = payroll
        .compute_salary(salary_request("t1", "2024-03", SalaryInputs::new(100_000)))
        .await
        .unwrap();

    let finalized = payroll.finalize_salary(&salary.id).await.unwrap();
    assert!(finalized.is_finalized());
    assert_eq!(finalized.status, SalaryStatus::Completed);

    let err = payroll.recompute_salary(&salary.id).await.unwrap_err();
    assert!(matches!(err, SchoolError::Payroll(PayrollError::Finalized(ref i)) if *i == salary.id));
    assert!(payroll.finalize_salary(&salary.id).await.is_err());

    let stored: TeacherSalary = db.require(&salary.id).await.unwrap();
    assert_eq!(stored.finalized_at, finalized.finalized_at);
}

#[tokio::test]
async fn test_finalized_salary_rejects_direct_updates() {
    let db = sqlite_db();
    let payroll = db.payroll();

    let salary = payroll
        .compute_salary(salary_request("t1", "2024-04", SalaryInputs::new(150_000)))
        .await
        .unwrap();

    db.update(&salary.id, Patch::<TeacherSalary>::new().set("bonuses", 5_000))
        .await
        .unwrap();
    payroll.finalize_salary(&salary.id).await.unwrap();

    let err = db
        .update(&salary.id, Patch::<TeacherSalary>::new().set("deductions", 20_000))
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Payroll(PayrollError::Finalized(ref i)) if *i == salary.id));

    let stored: TeacherSalary = db.require(&salary.id).await.unwrap();
    assert_eq!(stored.bonuses, 5_000);
    assert_eq!(stored.deductions, 0);
}

#[tokio::test]
async fn test_concurrent_finalize_and_recompute() {
    let db = local_db();
    let payroll = db.payroll();

    let salary = payroll
        .compute_salary(salary_request("t1", "2024-03", SalaryInputs::new(100_000)))
        .await
        .unwrap();

    let (finalized, recomputed) = tokio::join!(
        payroll.finalize_salary(&salary.id),
        payroll.recompute_salary(&salary.id),
    );
    assert!(finalized.is_ok());
    if let Err(err) = recomputed {
        assert!(matches!(err, SchoolError::Payroll(PayrollError::Finalized(_))));
    }

    let stored: TeacherSalary = db.require(&salary.id).await.unwrap();
    assert!(stored.is_finalized());
}

#[tokio::test]
async fn test_monthly_cost_replaces_previous() {
    let db = local_db();
    let payroll = db.payroll();

    payroll
        .record_advance(advance_request("t1", "2024-03", 50_000))
        .await
        .unwrap();
    payroll
        .compute_salary(salary_request(
            "t1",
            "2024-03",
            SalaryInputs::new(300_000).with_bonuses(20_000).with_deductions(10_000),
        ))
        .await
        .unwrap();
    payroll
        .compute_salary(salary_request("t2", "2024-03", SalaryInputs::new(200_000)))
        .await
        .unwrap();
    payroll
        .compute_salary(salary_request("t1", "2024-02", SalaryInputs::new(300_000)))
        .await
        .unwrap();

    let march = month("2024-03");
    let first = payroll.generate_monthly_cost(&march).await.unwrap();
    assert_eq!(first.teacher_count, 2);
    assert_eq!(first.total_base_salaries, 500_000);
    assert_eq!(first.total_advances, 50_000);
    assert_eq!(first.total_bonuses, 20_000);
    assert_eq!(first.total_deductions, 10_000);
    assert_eq!(first.total_cost, 510_000);
    assert_eq!(first.year, "2024");

    payroll.generate_monthly_cost(&month("2024-02")).await.unwrap();
    let second = payroll.generate_monthly_cost(&march).await.unwrap();

    let costs: Vec<MonthlySalaryCost> = db.list().await.unwrap();
    let march_costs: Vec<_> = costs.iter().filter(|c| c.month == march).collect();
    assert_eq!(march_costs.len(), 1);
    assert_eq!(march_costs[0].id, second.id);
    assert_eq!(costs.len(), 2);
}

#[tokio::test]
async fn test_advance_date_defaults_to_today() {
    let db = local_db();
    let advance = db
        .payroll()
        .record_advance(advance_request("t1", "2024-03", 5_000))
        .await
        .unwrap();
    assert_eq!(advance.date.len(), 10);
    assert_eq!(&advance.date[4..5], "-");
    assert!(advance.receipt_number.starts_with("ADV"));
}

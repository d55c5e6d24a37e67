//! Student fee collection and the dues list.
//!
//! A student's twelve month columns hold the fee status shown on the fees
//! screen. Collecting a fee stores a receipt row and marks the month paid in
//! a single transaction.

use super::{
    clean,
    projection::{compare_roll_values, roll_number_value},
    require_positive,
};
use crate::{
    backend::{Backend, ChangeKind, mutation},
    entities::{FeeRecord, Student, fee_record, student},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::{Month, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde_json::json;
use tracing::{info, instrument};

/// Status written to a month column once its fee is collected.
pub const PAID: &str = "Paid";

/// Whether a stored month status counts as paid.
#[must_use]
pub fn is_paid(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.trim().eq_ignore_ascii_case(PAID))
}

/// January up to and including `through`.
pub fn months_through(through: Month) -> impl Iterator<Item = Month> {
    (1..=through.number_from_month())
        .filter_map(|n| u8::try_from(n).ok())
        .filter_map(|n| Month::try_from(n).ok())
}

/// Records a fee payment for one month and marks that month paid.
#[instrument(skip(backend, session, notes), fields(uid = %session.uid, month = month.name()))]
pub async fn collect_fee(
    backend: &Backend,
    session: &SessionContext,
    student_id: i64,
    month: Month,
    amount: f64,
    notes: Option<String>,
) -> Result<fee_record::Model> {
    require_positive(amount)?;

    let txn = backend
        .connection()
        .begin()
        .await
        .map_err(|e| mutation::failure::<FeeRecord>(&e))?;

    let student = Student::find_by_id(student_id)
        .filter(student::Column::Uid.eq(session.uid.as_str()))
        .one(&txn)
        .await
        .map_err(|e| mutation::failure::<Student>(&e))?
        .ok_or_else(|| Error::NotFound {
            entity: "student",
            id: student_id.to_string(),
        })?;

    let record = fee_record::ActiveModel {
        uid: Set(session.uid.clone()),
        student_id: Set(student.id),
        month: Set(month.name().to_string()),
        amount: Set(amount),
        paid_at: Set(Utc::now()),
        notes: Set(clean(notes)),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| mutation::failure::<FeeRecord>(&e))?;

    let mut status: student::ActiveModel = student.into();
    status.set(
        student::fee_status_column(month),
        Some(PAID.to_string()).into(),
    );
    status
        .update(&txn)
        .await
        .map_err(|e| mutation::failure::<Student>(&e))?;

    txn.commit()
        .await
        .map_err(|e| mutation::failure::<FeeRecord>(&e))?;

    mutation::announce::<FeeRecord>(backend, ChangeKind::Insert, serde_json::to_value(&record)?);
    mutation::announce::<Student>(backend, ChangeKind::Update, json!({ "id": student_id }));
    info!("Collected {} for student {}", amount, student_id);
    Ok(record)
}

/// One row of the dues list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDues {
    pub student_id: i64,
    pub name: String,
    pub class: Option<String>,
    pub roll_number: Option<String>,
    /// Months up to the cutoff without a paid status, in calendar order
    pub unpaid: Vec<Month>,
}

/// Students with at least one unpaid month from January through `through`.
///
/// Grouped by class name, then in roll-number order within a class.
#[must_use]
pub fn dues_list(students: &[student::Model], through: Month) -> Vec<StudentDues> {
    let mut rows: Vec<StudentDues> = students
        .iter()
        .filter_map(|s| {
            let unpaid: Vec<Month> = months_through(through)
                .filter(|m| !is_paid(s.fee_status(*m)))
                .collect();
            (!unpaid.is_empty()).then(|| StudentDues {
                student_id: s.id,
                name: s.name.clone(),
                class: s.class.clone(),
                roll_number: s.roll_number.clone(),
                unpaid,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.class
            .cmp(&b.class)
            .then_with(|| {
                compare_roll_values(
                    roll_number_value(a.roll_number.as_deref()),
                    roll_number_value(b.roll_number.as_deref()),
                )
            })
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    rows
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::backend::fetch_by_id;
    use crate::test_utils::{create_test_student, setup_test_backend, student_row, test_session};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_is_paid() {
        assert!(is_paid(Some("Paid")));
        assert!(is_paid(Some(" paid ")));
        assert!(!is_paid(Some("Pending")));
        assert!(!is_paid(Some("")));
        assert!(!is_paid(None));
    }

    #[test]
    fn test_months_through() {
        let months: Vec<_> = months_through(Month::March).collect();
        assert_eq!(months, [Month::January, Month::February, Month::March]);
        assert_eq!(months_through(Month::December).count(), 12);
    }

    #[tokio::test]
    async fn test_collect_fee_rejects_non_positive_amount() -> Result<()> {
        let backend = Backend::new(MockDatabase::new(DatabaseBackend::Sqlite).into_connection());
        let session = test_session();

        for amount in [0.0, -5.0, f64::NAN] {
            let result = collect_fee(&backend, &session, 1, Month::May, amount, None).await;
            assert!(result.unwrap_err().is_validation());
        }

        assert!(backend.into_connection().unwrap().into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_fee_marks_month_paid_and_notifies() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        let student = create_test_student(&backend, &session, "Asha", "5A", "7").await?;
        let mut fee_changes = backend.feed().subscribe("fee_records", None);
        let mut student_changes = backend.feed().subscribe("students", None);

        let record = collect_fee(
            &backend,
            &session,
            student.id,
            Month::June,
            750.0,
            Some("cash".to_string()),
        )
        .await?;

        assert_eq!(record.month, "June");
        assert_eq!(record.amount, 750.0);
        let stored = fetch_by_id::<Student>(&backend, student.id).await?.unwrap();
        assert_eq!(stored.fee_status(Month::June), Some(PAID));
        assert_eq!(stored.fee_status(Month::May), None);

        assert_eq!(fee_changes.next().await.unwrap().kind, ChangeKind::Insert);
        let event = student_changes.next().await.unwrap();
        assert_eq!(event.record, json!({ "id": student.id }));
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_fee_for_other_account_is_not_found() -> Result<()> {
        let backend = setup_test_backend().await?;
        let student = create_test_student(&backend, &test_session(), "Asha", "5A", "7").await?;
        let stranger = SessionContext::new("school-2".to_string(), "other@example.org".to_string());

        let result = collect_fee(&backend, &stranger, student.id, Month::June, 10.0, None).await;

        assert!(matches!(result, Err(Error::NotFound { entity: "student", .. })));
        Ok(())
    }

    #[test]
    fn test_dues_list() {
        let mut paid_up = student_row(1, "Ann", Some("5A"), Some("2"));
        paid_up.january = Some("Paid".to_string());
        paid_up.february = Some("paid".to_string());
        let mut partial = student_row(2, "Bo", Some("5A"), Some("1"));
        partial.january = Some("Paid".to_string());
        let owing = student_row(3, "Cy", Some("4B"), None);

        let dues = dues_list(&[paid_up, partial, owing], Month::February);

        assert_eq!(dues.len(), 2);
        assert_eq!(dues[0].name, "Cy");
        assert_eq!(dues[0].unpaid, [Month::January, Month::February]);
        assert_eq!(dues[1].name, "Bo");
        assert_eq!(dues[1].unpaid, [Month::February]);
    }
}

//! Dashboard summary - headline figures for the signed-in account.

use crate::{
    backend::{Backend, Query, fetch},
    entities::{
        Class, Expense, FeeRecord, Staff, Student, class, expense, fee_record, staff, student,
    },
    errors::Result,
    session::SessionContext,
};
use chrono::{Datelike, NaiveDate};
use tracing::instrument;

/// Headline figures shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub students: usize,
    pub active_staff: usize,
    pub classes: usize,
    /// Fees collected in the current month
    pub fees_collected: f64,
    /// Expenses dated in the current month
    pub expenses: f64,
    /// Salary still owed across all staff
    pub salary_dues: f64,
}

/// Computes the dashboard for the month containing `today`.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn dashboard_summary(
    backend: &Backend,
    session: &SessionContext,
    today: NaiveDate,
) -> Result<DashboardSummary> {
    let uid = session.uid.clone();
    let same_month =
        |date: NaiveDate| date.year() == today.year() && date.month() == today.month();

    let students = fetch::<Student>(
        backend,
        &Query::all().filter_eq(student::Column::Uid, uid.clone()),
    )
    .await?;
    let staff =
        fetch::<Staff>(backend, &Query::all().filter_eq(staff::Column::Uid, uid.clone())).await?;
    let classes =
        fetch::<Class>(backend, &Query::all().filter_eq(class::Column::Uid, uid.clone())).await?;
    let expenses = fetch::<Expense>(
        backend,
        &Query::all().filter_eq(expense::Column::Uid, uid.clone()),
    )
    .await?;
    let fees =
        fetch::<FeeRecord>(backend, &Query::all().filter_eq(fee_record::Column::Uid, uid)).await?;

    Ok(DashboardSummary {
        students: students.len(),
        active_staff: staff.iter().filter(|s| s.is_active).count(),
        classes: classes.len(),
        fees_collected: fees
            .iter()
            .filter(|f| same_month(f.paid_at.date_naive()))
            .map(|f| f.amount)
            .sum(),
        expenses: expenses
            .iter()
            .filter(|e| same_month(e.date))
            .map(|e| e.amount)
            .sum(),
        salary_dues: staff.iter().map(|s| s.total_dues).sum(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        expense::{ExpenseForm, create_expense},
        fees::collect_fee,
        staff::{pay_salary, set_active},
    };
    use crate::test_utils::{
        create_test_class, create_test_staff, create_test_student, setup_test_backend,
        test_session,
    };
    use chrono::{Month, Utc};

    #[tokio::test]
    async fn test_empty_dashboard() -> Result<()> {
        let backend = setup_test_backend().await?;

        let summary = dashboard_summary(&backend, &test_session(), Utc::now().date_naive()).await?;

        assert_eq!(summary, DashboardSummary::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_totals() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        let today = Utc::now().date_naive();

        let student = create_test_student(&backend, &session, "Asha", "5A", "1").await?;
        create_test_student(&backend, &session, "Bo", "5A", "2").await?;
        create_test_class(&backend, &session, "5A").await?;
        create_test_staff(&backend, &session, "T-01", "Meera").await?;
        let leaver = create_test_staff(&backend, &session, "T-02", "Arjun").await?;
        set_active(&backend, &session, leaver.id, false).await?;
        pay_salary(&backend, &session, "T-01", 5000.0, None).await?;
        collect_fee(&backend, &session, student.id, Month::January, 800.0, None).await?;
        for (date, amount) in [(today, 300.0), (today - chrono::Days::new(400), 999.0)] {
            let form = ExpenseForm {
                date,
                category: "Maintenance".to_string(),
                amount,
                notes: None,
            };
            create_expense(&backend, &session, form).await?;
        }

        let summary = dashboard_summary(&backend, &session, today).await?;

        assert_eq!(summary.students, 2);
        assert_eq!(summary.active_staff, 1);
        assert_eq!(summary.classes, 1);
        assert_eq!(summary.fees_collected, 800.0);
        assert_eq!(summary.expenses, 300.0);
        assert_eq!(summary.salary_dues, 35000.0);
        Ok(())
    }
}

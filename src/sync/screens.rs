//! Screen presets: the generic binding instantiated once per record type.
//!
//! Every list is scoped to the session's account and ordered the way the
//! console lists it.

use super::screen::{Screen, ScreenSetup, Watch};
use crate::{
    backend::{Backend, Query, RowFilter},
    entities::{
        Assignment, Attendance, Class, Expense, FeeType, SalaryRecord, Staff, Student, Subject,
        assignment, attendance, class, expense, fee_type, salary_record, staff, student, subject,
    },
    session::SessionContext,
};
use std::time::Duration;

/// Students by name; also refetches when classes change.
pub async fn students(
    backend: &Backend,
    session: &SessionContext,
    banner_ttl: Duration,
) -> Screen<Student> {
    let setup = ScreenSetup {
        name: "students",
        query: Query::all()
            .filter_eq(student::Column::Uid, session.uid.clone())
            .order_asc(student::Column::Name),
        watches: vec![Watch::table::<Student>(), Watch::table::<Class>()],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// Classes by name.
pub async fn classes(
    backend: &Backend,
    session: &SessionContext,
    banner_ttl: Duration,
) -> Screen<Class> {
    let setup = ScreenSetup {
        name: "classes",
        query: Query::all()
            .filter_eq(class::Column::Uid, session.uid.clone())
            .order_asc(class::Column::ClassName),
        watches: vec![Watch::table::<Class>()],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// Staff by name; salary payments change the totals so they refetch too.
pub async fn staff(
    backend: &Backend,
    session: &SessionContext,
    banner_ttl: Duration,
) -> Screen<Staff> {
    let setup = ScreenSetup {
        name: "staff",
        query: Query::all()
            .filter_eq(staff::Column::Uid, session.uid.clone())
            .order_asc(staff::Column::Name),
        watches: vec![Watch::table::<Staff>(), Watch::table::<SalaryRecord>()],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// One staff member's salary payments, newest first.
pub async fn salary_history(
    backend: &Backend,
    session: &SessionContext,
    staff_id: &str,
    banner_ttl: Duration,
) -> Screen<SalaryRecord> {
    let setup = ScreenSetup {
        name: "salary_history",
        query: Query::all()
            .filter_eq(salary_record::Column::Uid, session.uid.clone())
            .filter_eq(salary_record::Column::StaffId, staff_id.to_string())
            .order_desc(salary_record::Column::DateTime),
        watches: vec![Watch::filtered::<SalaryRecord>(RowFilter::eq(
            "staff_id", staff_id,
        ))],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// Expenses, newest first.
pub async fn expenses(
    backend: &Backend,
    session: &SessionContext,
    banner_ttl: Duration,
) -> Screen<Expense> {
    let setup = ScreenSetup {
        name: "expenses",
        query: Query::all()
            .filter_eq(expense::Column::Uid, session.uid.clone())
            .order_desc(expense::Column::Date),
        watches: vec![Watch::table::<Expense>()],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// Fee types by name.
pub async fn fee_types(
    backend: &Backend,
    session: &SessionContext,
    banner_ttl: Duration,
) -> Screen<FeeType> {
    let setup = ScreenSetup {
        name: "fee_types",
        query: Query::all()
            .filter_eq(fee_type::Column::Uid, session.uid.clone())
            .order_asc(fee_type::Column::FeesName),
        watches: vec![Watch::table::<FeeType>()],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// Attendance sheets of one class, most recent day first.
pub async fn attendance(
    backend: &Backend,
    session: &SessionContext,
    class_id: i64,
    banner_ttl: Duration,
) -> Screen<Attendance> {
    let setup = ScreenSetup {
        name: "attendance",
        query: Query::all()
            .filter_eq(attendance::Column::Uid, session.uid.clone())
            .filter_eq(attendance::Column::ClassId, class_id)
            .order_desc(attendance::Column::Date),
        watches: vec![Watch::filtered::<Attendance>(RowFilter::eq(
            "class_id", class_id,
        ))],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// Subjects by name.
pub async fn subjects(
    backend: &Backend,
    session: &SessionContext,
    banner_ttl: Duration,
) -> Screen<Subject> {
    let setup = ScreenSetup {
        name: "subjects",
        query: Query::all()
            .filter_eq(subject::Column::Uid, session.uid.clone())
            .order_asc(subject::Column::SubjectName),
        watches: vec![Watch::table::<Subject>()],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

/// Subject assignments of one class, by start time.
pub async fn assignments(
    backend: &Backend,
    session: &SessionContext,
    class_id: i64,
    banner_ttl: Duration,
) -> Screen<Assignment> {
    let setup = ScreenSetup {
        name: "assignments",
        query: Query::all()
            .filter_eq(assignment::Column::Uid, session.uid.clone())
            .filter_eq(assignment::Column::ClassId, class_id)
            .order_asc(assignment::Column::IncomingTime),
        watches: vec![
            Watch::filtered::<Assignment>(RowFilter::eq("class_id", class_id)),
            Watch::table::<Subject>(),
        ],
        banner_ttl,
    };
    Screen::mount(backend, session, setup).await
}

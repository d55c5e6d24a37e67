//! Shared test utilities for `SchoolDesk`.
//!
//! This module provides common helper functions for setting up an in-memory
//! backend, a signed-in session, and test records with sensible defaults.

use crate::{
    auth::Registration,
    backend::Backend,
    core::{
        class::{ClassForm, create_class},
        staff::{StaffForm, create_staff},
        student::{StudentForm, create_student},
    },
    entities::{class, expense, staff, student},
    errors::Result,
    session::SessionContext,
};
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

/// Routes tracing output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` backend with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_backend() -> Result<Backend> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(Backend::new(db))
}

/// A session for account `school-1`, without any operator row behind it.
pub fn test_session() -> SessionContext {
    SessionContext::new("school-1", "office@example.org")
}

/// Registration details whose credentials the auth tests sign in with.
pub fn test_registration() -> Registration {
    Registration {
        email: "office@example.org".to_string(),
        password: "secret-pass".to_string(),
        school_name: "Green Valley School".to_string(),
        mobile_number: "9000000000".to_string(),
    }
}

/// Creates a test student through the mutation gateway.
///
/// # Arguments
/// * `class` - Class name
/// * `roll_number` - Roll number as entered; empty stores no roll number
pub async fn create_test_student(
    backend: &Backend,
    session: &SessionContext,
    name: &str,
    class: &str,
    roll_number: &str,
) -> Result<student::Model> {
    let form = StudentForm {
        name: name.to_string(),
        class: Some(class.to_string()),
        roll_number: Some(roll_number.to_string()),
        registration_date: NaiveDate::from_ymd_opt(2025, 4, 1),
        ..Default::default()
    };
    create_student(backend, session, form).await
}

/// Creates an active test staff member.
///
/// # Defaults
/// * `mobile`: "9000000001"
/// * `salary_amount`: 20000.0 (also the initial dues)
pub async fn create_test_staff(
    backend: &Backend,
    session: &SessionContext,
    staff_id: &str,
    name: &str,
) -> Result<staff::Model> {
    let form = StaffForm {
        staff_id: staff_id.to_string(),
        name: name.to_string(),
        mobile: "9000000001".to_string(),
        salary_amount: 20000.0,
        ..Default::default()
    };
    create_staff(backend, session, form).await
}

/// Creates a test class without a class teacher or fees.
pub async fn create_test_class(
    backend: &Backend,
    session: &SessionContext,
    class_name: &str,
) -> Result<class::Model> {
    let form = ClassForm {
        class_name: class_name.to_string(),
        ..Default::default()
    };
    create_class(backend, session, form).await
}

/// An unsaved student model for pure projection tests.
pub fn student_row(
    id: i64,
    name: &str,
    class: Option<&str>,
    roll_number: Option<&str>,
) -> student::Model {
    student::Model {
        id,
        uid: "school-1".to_string(),
        roll_number: roll_number.map(str::to_string),
        name: name.to_string(),
        mobile: None,
        gmail: None,
        father_name: None,
        mother_name: None,
        class: class.map(str::to_string),
        address: None,
        photo_url: None,
        aadhar: None,
        gender: None,
        date_of_birth: None,
        registration_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or_default(),
        caste: None,
        blood_group: None,
        previous_school_name: None,
        january: None,
        february: None,
        march: None,
        april: None,
        may: None,
        june: None,
        july: None,
        august: None,
        september: None,
        october: None,
        november: None,
        december: None,
    }
}

/// An unsaved staff model for pure projection tests.
pub fn staff_row(id: i64, staff_id: &str, name: &str, is_active: bool) -> staff::Model {
    staff::Model {
        id,
        uid: "school-1".to_string(),
        staff_id: staff_id.to_string(),
        name: name.to_string(),
        mobile: "9000000001".to_string(),
        gmail: None,
        father_name: None,
        mother_name: None,
        address: None,
        highest_qualification: None,
        joining_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
        photo_url: None,
        salary_amount: 20000.0,
        total_paid: 0.0,
        total_dues: 0.0,
        is_active,
    }
}

/// An unsaved expense model for pure projection tests.
pub fn expense_row(id: i64, (y, m, d): (i32, u32, u32), category: &str, amount: f64) -> expense::Model {
    expense::Model {
        id,
        uid: "school-1".to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        category: category.to_string(),
        notes: None,
        amount,
    }
}

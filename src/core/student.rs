//! Student records
//!
//! Create and edit forms, plus the delete cascade that removes a student's
//! collected fee records before the student itself.

use super::clean;
use crate::{
    backend::{Backend, Query, fetch, mutation},
    entities::{FeeRecord, Student, fee_record, student},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::{NaiveDate, Utc};
use sea_orm::Set;
use tracing::{error, info, instrument};

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

/// Fields of the add/edit student form.
///
/// Blank optional fields are stored as `NULL`. The twelve monthly fee
/// statuses are not part of the form; fee collection owns them.
#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    pub name: String,
    pub roll_number: Option<String>,
    pub class: Option<String>,
    pub mobile: Option<String>,
    pub gmail: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub aadhar: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Defaults to today when left empty
    pub registration_date: Option<NaiveDate>,
    pub caste: Option<String>,
    pub blood_group: Option<String>,
    pub previous_school_name: Option<String>,
}

impl StudentForm {
    /// Pre-fills the form from a stored student for editing.
    #[must_use]
    pub fn from_model(model: &student::Model) -> Self {
        Self {
            name: model.name.clone(),
            roll_number: model.roll_number.clone(),
            class: model.class.clone(),
            mobile: model.mobile.clone(),
            gmail: model.gmail.clone(),
            father_name: model.father_name.clone(),
            mother_name: model.mother_name.clone(),
            address: model.address.clone(),
            photo_url: model.photo_url.clone(),
            aadhar: model.aadhar.clone(),
            gender: model.gender.clone(),
            date_of_birth: model.date_of_birth,
            registration_date: Some(model.registration_date),
            caste: model.caste.clone(),
            blood_group: model.blood_group.clone(),
            previous_school_name: model.previous_school_name.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Student name is required."));
        }
        if let Some(gender) = self.gender.as_deref().map(str::trim)
            && !gender.is_empty()
            && !GENDERS.contains(&gender)
        {
            return Err(Error::validation(format!(
                "Gender must be one of {}.",
                GENDERS.join(", ")
            )));
        }
        if let Some(gmail) = self.gmail.as_deref().map(str::trim)
            && !gmail.is_empty()
            && !gmail.contains('@')
        {
            return Err(Error::validation("Please enter a valid email address."));
        }
        Ok(())
    }

    fn into_active_model(self) -> student::ActiveModel {
        student::ActiveModel {
            roll_number: Set(clean(self.roll_number)),
            name: Set(self.name.trim().to_string()),
            mobile: Set(clean(self.mobile)),
            gmail: Set(clean(self.gmail)),
            father_name: Set(clean(self.father_name)),
            mother_name: Set(clean(self.mother_name)),
            class: Set(clean(self.class)),
            address: Set(clean(self.address)),
            photo_url: Set(clean(self.photo_url)),
            aadhar: Set(clean(self.aadhar)),
            gender: Set(clean(self.gender)),
            date_of_birth: Set(self.date_of_birth),
            registration_date: Set(self
                .registration_date
                .unwrap_or_else(|| Utc::now().date_naive())),
            caste: Set(clean(self.caste)),
            blood_group: Set(clean(self.blood_group)),
            previous_school_name: Set(clean(self.previous_school_name)),
            ..Default::default()
        }
    }
}

/// Adds a student to the session's account.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn create_student(
    backend: &Backend,
    session: &SessionContext,
    form: StudentForm,
) -> Result<student::Model> {
    form.validate()?;
    let mut model = form.into_active_model();
    model.uid = Set(session.uid.clone());
    let created = mutation::create(backend, model).await?;
    info!("Added student {} ({})", created.name, created.id);
    Ok(created)
}

/// Saves an edited student. Fee statuses are left untouched.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn update_student(
    backend: &Backend,
    session: &SessionContext,
    id: i64,
    form: StudentForm,
) -> Result<student::Model> {
    form.validate()?;
    mutation::update(backend, &session.uid, id, form.into_active_model()).await
}

/// Deletes a student after removing its fee records.
///
/// Runs children first and stops at the first failure. The two deletes are
/// separate writes: if the second one fails the fee records are already gone
/// and the student remains. Returns the number of fee records removed.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn delete_student(
    backend: &Backend,
    session: &SessionContext,
    student_id: i64,
) -> Result<u64> {
    let fee_records = mutation::delete_where::<FeeRecord, _>(
        backend,
        &session.uid,
        fee_record::Column::StudentId,
        student_id,
    )
    .await?;

    mutation::delete::<Student>(backend, &session.uid, student_id)
        .await
        .inspect_err(|e| {
            error!(
                "Removed {} fee records but the student delete failed: {}",
                fee_records, e
            );
        })?;

    info!(
        "Deleted student {} with {} fee records",
        student_id, fee_records
    );
    Ok(fee_records)
}

/// Collected fee records of one student, newest first.
pub async fn fee_history(
    backend: &Backend,
    session: &SessionContext,
    student_id: i64,
) -> Result<Vec<fee_record::Model>> {
    let query = Query::all()
        .filter_eq(fee_record::Column::Uid, session.uid.clone())
        .filter_eq(fee_record::Column::StudentId, student_id)
        .order_desc(fee_record::Column::PaidAt);
    fetch::<FeeRecord>(backend, &query).await
}

//! Classes, subjects and the subject timetable of each class.

use super::{clean, require_positive};
use crate::{
    backend::{Backend, mutation},
    entities::{Assignment, Attendance, Class, Subject, assignment, attendance, class, subject},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::NaiveTime;
use sea_orm::Set;
use tracing::{info, instrument};

/// Fields of the add/edit class form.
#[derive(Debug, Clone, Default)]
pub struct ClassForm {
    pub class_name: String,
    /// Class teacher's staff id
    pub staff_id: Option<String>,
    /// Monthly school fees for the class
    pub school_fees: Option<f64>,
}

impl ClassForm {
    fn validate(&self) -> Result<()> {
        if self.class_name.trim().is_empty() {
            return Err(Error::validation("Class name is required."));
        }
        if let Some(fees) = self.school_fees {
            require_positive(fees)?;
        }
        Ok(())
    }

    fn into_active_model(self) -> class::ActiveModel {
        class::ActiveModel {
            class_name: Set(self.class_name.trim().to_string()),
            staff_id: Set(clean(self.staff_id)),
            school_fees: Set(self.school_fees),
            ..Default::default()
        }
    }
}

/// Adds a class.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn create_class(
    backend: &Backend,
    session: &SessionContext,
    form: ClassForm,
) -> Result<class::Model> {
    form.validate()?;
    let mut model = form.into_active_model();
    model.uid = Set(session.uid.clone());
    mutation::create(backend, model).await
}

/// Saves an edited class.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn update_class(
    backend: &Backend,
    session: &SessionContext,
    id: i64,
    form: ClassForm,
) -> Result<class::Model> {
    form.validate()?;
    mutation::update(backend, &session.uid, id, form.into_active_model()).await
}

/// Deletes a class with its attendance sheets and subject assignments.
///
/// Students keep their class name; they show up under the name until moved.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn delete_class(backend: &Backend, session: &SessionContext, id: i64) -> Result<()> {
    let owner = session.uid.as_str();
    let sheets =
        mutation::delete_where::<Attendance, _>(backend, owner, attendance::Column::ClassId, id)
            .await?;
    let assignments =
        mutation::delete_where::<Assignment, _>(backend, owner, assignment::Column::ClassId, id)
            .await?;
    mutation::delete::<Class>(backend, owner, id).await?;
    info!(
        "Deleted class {} with {} attendance sheets and {} assignments",
        id, sheets, assignments
    );
    Ok(())
}

/// Adds a subject.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn create_subject(
    backend: &Backend,
    session: &SessionContext,
    subject_name: &str,
) -> Result<subject::Model> {
    let subject_name = subject_name.trim();
    if subject_name.is_empty() {
        return Err(Error::validation("Subject name is required."));
    }
    let model = subject::ActiveModel {
        uid: Set(session.uid.clone()),
        subject_name: Set(subject_name.to_string()),
        ..Default::default()
    };
    mutation::create(backend, model).await
}

/// Deletes a subject and every class assignment of it.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn delete_subject(backend: &Backend, session: &SessionContext, id: i64) -> Result<u64> {
    let owner = session.uid.as_str();
    let assignments =
        mutation::delete_where::<Assignment, _>(backend, owner, assignment::Column::SubjectId, id)
            .await?;
    mutation::delete::<Subject>(backend, owner, id).await?;
    Ok(assignments)
}

/// One timetable slot: a subject taught in a class.
#[derive(Debug, Clone, Default)]
pub struct AssignmentForm {
    pub class_id: i64,
    pub subject_id: i64,
    /// Teacher's staff id
    pub staff_id: Option<String>,
    pub incoming_time: Option<NaiveTime>,
    pub outgoing_time: Option<NaiveTime>,
}

/// Assigns a subject (and optionally a teacher and period) to a class.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn assign_subject(
    backend: &Backend,
    session: &SessionContext,
    form: AssignmentForm,
) -> Result<assignment::Model> {
    if let (Some(start), Some(end)) = (form.incoming_time, form.outgoing_time)
        && end <= start
    {
        return Err(Error::validation("The period must end after it starts."));
    }
    let model = assignment::ActiveModel {
        uid: Set(session.uid.clone()),
        class_id: Set(form.class_id),
        subject_id: Set(form.subject_id),
        staff_id: Set(clean(form.staff_id)),
        incoming_time: Set(form.incoming_time),
        outgoing_time: Set(form.outgoing_time),
        ..Default::default()
    };
    mutation::create(backend, model).await
}

/// Removes one timetable slot.
pub async fn unassign_subject(backend: &Backend, session: &SessionContext, id: i64) -> Result<u64> {
    mutation::delete::<Assignment>(backend, &session.uid, id).await
}

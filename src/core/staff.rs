//! Staff records and salary bookkeeping
//!
//! Each staff member carries running totals: `total_paid` grows with every
//! recorded payment and `total_dues` shrinks with it, never below zero.
//! Monthly accrual adds one month's salary to the dues of active staff.

use super::{clean, require_positive};
use crate::{
    backend::{Backend, ChangeKind, Query, fetch, mutation},
    entities::{SalaryRecord, Staff, salary_record, staff},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Fields of the add/edit staff form.
#[derive(Debug, Clone, Default)]
pub struct StaffForm {
    /// School-assigned identifier, e.g. `"T-004"`
    pub staff_id: String,
    pub name: String,
    pub mobile: String,
    pub gmail: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub address: Option<String>,
    pub highest_qualification: Option<String>,
    /// Defaults to today when left empty
    pub joining_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    /// Monthly salary
    pub salary_amount: f64,
    /// `None` keeps the current status (active for new staff)
    pub is_active: Option<bool>,
}

impl StaffForm {
    /// Pre-fills the form from a stored staff member for editing.
    #[must_use]
    pub fn from_model(model: &staff::Model) -> Self {
        Self {
            staff_id: model.staff_id.clone(),
            name: model.name.clone(),
            mobile: model.mobile.clone(),
            gmail: model.gmail.clone(),
            father_name: model.father_name.clone(),
            mother_name: model.mother_name.clone(),
            address: model.address.clone(),
            highest_qualification: model.highest_qualification.clone(),
            joining_date: Some(model.joining_date),
            photo_url: model.photo_url.clone(),
            salary_amount: model.salary_amount,
            is_active: Some(model.is_active),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.staff_id.trim().is_empty() {
            return Err(Error::validation("Staff ID is required."));
        }
        if self.name.trim().is_empty() {
            return Err(Error::validation("Staff name is required."));
        }
        if self.mobile.trim().is_empty() {
            return Err(Error::validation("Mobile number is required."));
        }
        if !self.salary_amount.is_finite() || self.salary_amount < 0.0 {
            return Err(Error::validation("Please enter a valid salary amount."));
        }
        Ok(())
    }

    fn into_active_model(self) -> staff::ActiveModel {
        let mut model = staff::ActiveModel {
            staff_id: Set(self.staff_id.trim().to_string()),
            name: Set(self.name.trim().to_string()),
            mobile: Set(self.mobile.trim().to_string()),
            gmail: Set(clean(self.gmail)),
            father_name: Set(clean(self.father_name)),
            mother_name: Set(clean(self.mother_name)),
            address: Set(clean(self.address)),
            highest_qualification: Set(clean(self.highest_qualification)),
            joining_date: Set(self.joining_date.unwrap_or_else(|| Utc::now().date_naive())),
            photo_url: Set(clean(self.photo_url)),
            salary_amount: Set(self.salary_amount),
            ..Default::default()
        };
        if let Some(active) = self.is_active {
            model.is_active = Set(active);
        }
        model
    }
}

/// Adds a staff member with zero paid and one month's salary due.
#[instrument(skip(backend, session, form), fields(uid = %session.uid, staff_id = %form.staff_id))]
pub async fn create_staff(
    backend: &Backend,
    session: &SessionContext,
    form: StaffForm,
) -> Result<staff::Model> {
    form.validate()?;
    let salary = form.salary_amount;
    let mut model = form.into_active_model();
    model.uid = Set(session.uid.clone());
    model.total_paid = Set(0.0);
    model.total_dues = Set(salary);
    if model.is_active.is_not_set() {
        model.is_active = Set(true);
    }
    let created = mutation::create(backend, model).await?;
    info!("Added staff member {} ({})", created.name, created.staff_id);
    Ok(created)
}

/// Saves an edited staff member. Salary totals are left untouched.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn update_staff(
    backend: &Backend,
    session: &SessionContext,
    id: i64,
    form: StaffForm,
) -> Result<staff::Model> {
    form.validate()?;
    mutation::update(backend, &session.uid, id, form.into_active_model()).await
}

/// Marks a staff member active or inactive.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn set_active(
    backend: &Backend,
    session: &SessionContext,
    id: i64,
    active: bool,
) -> Result<staff::Model> {
    let changes = staff::ActiveModel {
        is_active: Set(active),
        ..Default::default()
    };
    mutation::update(backend, &session.uid, id, changes).await
}

/// Deletes a staff member after removing its salary records.
///
/// Same ordering as the student cascade: children first, stop at the first
/// failure, no transaction around the pair.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn delete_staff(backend: &Backend, session: &SessionContext, id: i64) -> Result<u64> {
    let member = Staff::find_by_id(id)
        .filter(staff::Column::Uid.eq(session.uid.as_str()))
        .one(backend.connection())
        .await
        .map_err(|e| mutation::failure::<Staff>(&e))?
        .ok_or_else(|| Error::NotFound {
            entity: "staff",
            id: id.to_string(),
        })?;

    let salary_records = mutation::delete_where::<SalaryRecord, _>(
        backend,
        &session.uid,
        salary_record::Column::StaffId,
        member.staff_id.clone(),
    )
    .await?;
    mutation::delete::<Staff>(backend, &session.uid, id).await?;

    info!(
        "Deleted staff member {} with {} salary records",
        member.staff_id, salary_records
    );
    Ok(salary_records)
}

/// Records a salary payment and moves the staff member's totals.
///
/// The amount is validated before anything reaches the backend. The record
/// and the totals are written in one transaction.
#[instrument(skip(backend, session, notes), fields(uid = %session.uid))]
pub async fn pay_salary(
    backend: &Backend,
    session: &SessionContext,
    staff_id: &str,
    amount: f64,
    notes: Option<String>,
) -> Result<salary_record::Model> {
    require_positive(amount)?;

    let txn = backend
        .connection()
        .begin()
        .await
        .map_err(|e| mutation::failure::<SalaryRecord>(&e))?;

    let member = Staff::find()
        .filter(staff::Column::Uid.eq(session.uid.as_str()))
        .filter(staff::Column::StaffId.eq(staff_id))
        .one(&txn)
        .await
        .map_err(|e| mutation::failure::<Staff>(&e))?
        .ok_or_else(|| Error::NotFound {
            entity: "staff",
            id: staff_id.to_string(),
        })?;

    let record = salary_record::ActiveModel {
        uid: Set(session.uid.clone()),
        staff_id: Set(member.staff_id.clone()),
        date_time: Set(Utc::now()),
        amount: Set(amount),
        notes: Set(clean(notes)),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| mutation::failure::<SalaryRecord>(&e))?;

    let total_paid = member.total_paid + amount;
    let total_dues = (member.total_dues - amount).max(0.0);
    let mut totals: staff::ActiveModel = member.into();
    totals.total_paid = Set(total_paid);
    totals.total_dues = Set(total_dues);
    let member = totals
        .update(&txn)
        .await
        .map_err(|e| mutation::failure::<Staff>(&e))?;

    txn.commit()
        .await
        .map_err(|e| mutation::failure::<SalaryRecord>(&e))?;

    mutation::announce::<SalaryRecord>(
        backend,
        ChangeKind::Insert,
        serde_json::to_value(&record)?,
    );
    mutation::announce::<Staff>(backend, ChangeKind::Update, serde_json::to_value(&member)?);
    info!(
        "Paid {} to {}; total paid {}, dues {}",
        amount, member.staff_id, total_paid, total_dues
    );
    Ok(record)
}

/// Adds one month's salary to the dues of every active staff member.
///
/// Returns how many staff members were charged. Meant to run once at the
/// start of each month.
#[instrument(skip(backend, session), fields(uid = %session.uid))]
pub async fn accrue_monthly_salaries(backend: &Backend, session: &SessionContext) -> Result<usize> {
    let txn = backend
        .connection()
        .begin()
        .await
        .map_err(|e| mutation::failure::<Staff>(&e))?;

    let active = Staff::find()
        .filter(staff::Column::Uid.eq(session.uid.as_str()))
        .filter(staff::Column::IsActive.eq(true))
        .all(&txn)
        .await
        .map_err(|e| mutation::failure::<Staff>(&e))?;

    let count = active.len();
    for member in active {
        debug!("Accruing {} for {}", member.salary_amount, member.staff_id);
        let total_dues = member.total_dues + member.salary_amount;
        let mut dues: staff::ActiveModel = member.into();
        dues.total_dues = Set(total_dues);
        dues.update(&txn)
            .await
            .map_err(|e| mutation::failure::<Staff>(&e))?;
    }

    txn.commit()
        .await
        .map_err(|e| mutation::failure::<Staff>(&e))?;

    if count > 0 {
        mutation::announce::<Staff>(
            backend,
            ChangeKind::Update,
            json!({ "uid": session.uid.as_str() }),
        );
    }
    info!("Accrued monthly salary for {} staff members", count);
    Ok(count)
}

/// Salary payments of one staff member, newest first.
pub async fn salary_history(
    backend: &Backend,
    session: &SessionContext,
    staff_id: &str,
) -> Result<Vec<salary_record::Model>> {
    let query = Query::all()
        .filter_eq(salary_record::Column::Uid, session.uid.clone())
        .filter_eq(salary_record::Column::StaffId, staff_id.to_string())
        .order_desc(salary_record::Column::DateTime);
    fetch::<SalaryRecord>(backend, &query).await
}

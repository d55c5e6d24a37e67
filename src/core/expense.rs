//! Expense ledger entries.

use super::{clean, require_positive};
use crate::{
    backend::{Backend, mutation},
    entities::{Expense, expense},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::NaiveDate;
use sea_orm::Set;
use tracing::instrument;

/// Fields of the add/edit expense form.
#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub notes: Option<String>,
}

impl ExpenseForm {
    fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(Error::validation("Expense category is required."));
        }
        require_positive(self.amount)
    }

    fn into_active_model(self) -> expense::ActiveModel {
        expense::ActiveModel {
            date: Set(self.date),
            category: Set(self.category.trim().to_string()),
            notes: Set(clean(self.notes)),
            amount: Set(self.amount),
            ..Default::default()
        }
    }
}

/// Records an expense.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn create_expense(
    backend: &Backend,
    session: &SessionContext,
    form: ExpenseForm,
) -> Result<expense::Model> {
    form.validate()?;
    let mut model = form.into_active_model();
    model.uid = Set(session.uid.clone());
    mutation::create(backend, model).await
}

/// Saves an edited expense.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn update_expense(
    backend: &Backend,
    session: &SessionContext,
    id: i64,
    form: ExpenseForm,
) -> Result<expense::Model> {
    form.validate()?;
    mutation::update(backend, &session.uid, id, form.into_active_model()).await
}

/// Deletes an expense.
pub async fn delete_expense(backend: &Backend, session: &SessionContext, id: i64) -> Result<u64> {
    mutation::delete::<Expense>(backend, &session.uid, id).await
}

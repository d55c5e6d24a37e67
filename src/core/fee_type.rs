//! Fee types offered by the school (tuition, transport, exam fees ...).

use super::require_positive;
use crate::{
    backend::{Backend, Query, fetch, mutation},
    config::settings::FeeTypeSeed,
    entities::{FeeType, fee_type},
    errors::{Error, Result},
    session::SessionContext,
};
use sea_orm::Set;
use tracing::{info, instrument};

/// Fields of the add/edit fee type form.
#[derive(Debug, Clone)]
pub struct FeeTypeForm {
    pub fees_name: String,
    pub amount: f64,
    /// Billing frequency, e.g. `"Monthly"`
    pub frequency: String,
}

impl From<&FeeTypeSeed> for FeeTypeForm {
    fn from(seed: &FeeTypeSeed) -> Self {
        Self {
            fees_name: seed.name.clone(),
            amount: seed.amount,
            frequency: seed.frequency.clone(),
        }
    }
}

impl FeeTypeForm {
    fn validate(&self) -> Result<()> {
        if self.fees_name.trim().is_empty() {
            return Err(Error::validation("Fee name is required."));
        }
        if self.frequency.trim().is_empty() {
            return Err(Error::validation("Fee frequency is required."));
        }
        require_positive(self.amount)
    }

    fn into_active_model(self) -> fee_type::ActiveModel {
        fee_type::ActiveModel {
            fees_name: Set(self.fees_name.trim().to_string()),
            amount: Set(self.amount),
            frequency: Set(self.frequency.trim().to_string()),
            ..Default::default()
        }
    }
}

/// Adds a fee type.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn create_fee_type(
    backend: &Backend,
    session: &SessionContext,
    form: FeeTypeForm,
) -> Result<fee_type::Model> {
    form.validate()?;
    let mut model = form.into_active_model();
    model.uid = Set(session.uid.clone());
    mutation::create(backend, model).await
}

/// Saves an edited fee type.
pub async fn update_fee_type(
    backend: &Backend,
    session: &SessionContext,
    id: i64,
    form: FeeTypeForm,
) -> Result<fee_type::Model> {
    form.validate()?;
    mutation::update(backend, &session.uid, id, form.into_active_model()).await
}

/// Deletes a fee type.
pub async fn delete_fee_type(backend: &Backend, session: &SessionContext, id: i64) -> Result<u64> {
    mutation::delete::<FeeType>(backend, &session.uid, id).await
}

/// Creates the configured fee types the account does not have yet.
///
/// Matching is by name, case-insensitively, so running it twice is harmless.
/// Returns how many fee types were created.
#[instrument(skip_all, fields(uid = %session.uid))]
pub async fn seed_fee_types(
    backend: &Backend,
    session: &SessionContext,
    seeds: &[FeeTypeSeed],
) -> Result<usize> {
    let existing = fetch::<FeeType>(
        backend,
        &Query::all().filter_eq(fee_type::Column::Uid, session.uid.clone()),
    )
    .await?;

    let mut created = 0;
    for seed in seeds {
        if existing
            .iter()
            .any(|f| f.fees_name.eq_ignore_ascii_case(seed.name.trim()))
        {
            continue;
        }
        create_fee_type(backend, session, FeeTypeForm::from(seed)).await?;
        created += 1;
    }
    info!("Seeded {} fee types", created);
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{setup_test_backend, test_session};

    fn seeds() -> Vec<FeeTypeSeed> {
        vec![
            FeeTypeSeed {
                name: "Tuition".to_string(),
                amount: 1200.0,
                frequency: "Monthly".to_string(),
            },
            FeeTypeSeed {
                name: "Transport".to_string(),
                amount: 600.0,
                frequency: "Monthly".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_seed_fee_types_is_idempotent() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();

        assert_eq!(seed_fee_types(&backend, &session, &seeds()).await?, 2);
        assert_eq!(seed_fee_types(&backend, &session, &seeds()).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_fee_type_validation() -> Result<()> {
        let backend = setup_test_backend().await?;
        let form = FeeTypeForm {
            fees_name: "Exam".to_string(),
            amount: 0.0,
            frequency: "Yearly".to_string(),
        };

        let result = create_fee_type(&backend, &test_session(), form).await;

        assert!(result.is_err_and(|e| e.is_validation()));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_and_delete_stay_in_account() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        let stranger = SessionContext::new("school-2", "other@example.org");
        let tuition = create_fee_type(&backend, &session, FeeTypeForm::from(&seeds()[0])).await?;

        let mut raised = FeeTypeForm::from(&seeds()[0]);
        raised.amount = 1500.0;
        assert!(matches!(
            update_fee_type(&backend, &stranger, tuition.id, raised.clone()).await,
            Err(Error::NotFound { entity: "fee type", .. })
        ));
        let updated = update_fee_type(&backend, &session, tuition.id, raised).await?;
        assert!((updated.amount - 1500.0).abs() < f64::EPSILON);

        assert!(delete_fee_type(&backend, &stranger, tuition.id).await.is_err());
        assert_eq!(delete_fee_type(&backend, &session, tuition.id).await?, 1);
        Ok(())
    }
}

//! School owner profile, one per account.

use super::clean;
use crate::{
    backend::{Backend, ChangeKind, mutation},
    entities::{OwnerProfile, owner_profile},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tracing::{info, instrument};

/// Loads the profile of the session's account.
pub async fn get_profile(
    backend: &Backend,
    session: &SessionContext,
) -> Result<Option<owner_profile::Model>> {
    OwnerProfile::find_by_id(session.uid.clone())
        .one(backend.connection())
        .await
        .map_err(|e| Error::Query {
            table: "owner_profiles".to_string(),
            message: e.to_string(),
        })
}

/// Fields of the profile settings form.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub school_name: String,
    pub principal_name: Option<String>,
    pub mobile_number: String,
    pub school_image_url: Option<String>,
    pub register_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub school_code: Option<String>,
}

impl ProfileForm {
    /// Pre-fills the form from the stored profile.
    #[must_use]
    pub fn from_model(model: &owner_profile::Model) -> Self {
        Self {
            school_name: model.school_name.clone(),
            principal_name: model.principal_name.clone(),
            mobile_number: model.mobile_number.clone(),
            school_image_url: model.school_image_url.clone(),
            register_date: model.register_date,
            address: model.address.clone(),
            website: model.website.clone(),
            school_code: model.school_code.clone(),
        }
    }
}

/// Saves the profile of the session's account.
#[instrument(skip(backend, session, form), fields(uid = %session.uid))]
pub async fn save_profile(
    backend: &Backend,
    session: &SessionContext,
    form: ProfileForm,
) -> Result<owner_profile::Model> {
    if form.school_name.trim().is_empty() {
        return Err(Error::validation("School name is required."));
    }
    if form.mobile_number.trim().is_empty() {
        return Err(Error::validation("Mobile number is required."));
    }

    let saved = owner_profile::ActiveModel {
        uid: Set(session.uid.clone()),
        school_name: Set(form.school_name.trim().to_string()),
        principal_name: Set(clean(form.principal_name)),
        mobile_number: Set(form.mobile_number.trim().to_string()),
        school_image_url: Set(clean(form.school_image_url)),
        register_date: Set(form.register_date),
        address: Set(clean(form.address)),
        website: Set(clean(form.website)),
        school_code: Set(clean(form.school_code)),
    }
    .update(backend.connection())
    .await
    .map_err(|e| mutation::failure::<OwnerProfile>(&e))?;

    mutation::announce::<OwnerProfile>(backend, ChangeKind::Update, serde_json::to_value(&saved)?);
    info!("Saved profile for {}", saved.school_name);
    Ok(saved)
}

//! Owner profile entity - The school's own details, one row per account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "owner_profiles")]
pub struct Model {
    /// Account identifier, shared with the operator credential
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: String,
    pub school_name: String,
    pub principal_name: Option<String>,
    pub mobile_number: String,
    pub school_image_url: Option<String>,
    pub register_date: Option<Date>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub school_code: Option<String>,
}

/// `OwnerProfile` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

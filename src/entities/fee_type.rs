//! Fee type entity - A named fee the school charges (tuition, transport, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fee type database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fee_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    pub fees_name: String,
    pub amount: f64,
    /// Billing frequency as entered (e.g. `"Monthly"`, `"Yearly"`)
    pub frequency: String,
}

/// `FeeType` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "fee type";

    fn owner_column() -> Column {
        Column::Uid
    }
}

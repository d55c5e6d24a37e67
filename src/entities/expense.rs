//! Expense entity - One school expense entry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    pub date: Date,
    /// Free-text category (e.g. `"Stationery"`, `"Electricity"`)
    pub category: String,
    pub notes: Option<String>,
    pub amount: f64,
}

/// `Expense` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "expense";

    fn owner_column() -> Column {
        Column::Uid
    }
}

//! Attendance entity - One class attendance sheet for one day.
//!
//! Present and absent roll numbers are stored comma-joined; see
//! [`crate::core::attendance::RollSet`] for the in-memory form.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    pub class_id: i64,
    pub date: Date,
    /// Comma-separated roll numbers marked present
    pub present: Option<String>,
    /// Comma-separated roll numbers marked absent
    pub absent: Option<String>,
}

/// Defines relationships between Attendance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sheet belongs to one class
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "attendance sheet";

    fn owner_column() -> Column {
        Column::Uid
    }
}

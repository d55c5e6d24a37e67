//! Fee record entity - One collected fee payment for a student and month.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fee record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fee_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    /// Student the fee was collected from
    pub student_id: i64,
    /// Month name the payment covers (e.g. `"January"`)
    pub month: String,
    pub amount: f64,
    pub paid_at: DateTimeUtc,
    pub notes: Option<String>,
}

/// Defines relationships between `FeeRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each fee record belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "fee record";

    fn owner_column() -> Column {
        Column::Uid
    }
}

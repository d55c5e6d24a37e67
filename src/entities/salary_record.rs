//! Salary record entity - One salary payment made to a staff member.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Salary record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salary_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    /// `staff.staff_id` of the payee
    pub staff_id: String,
    pub date_time: DateTimeUtc,
    pub amount: f64,
    pub notes: Option<String>,
}

/// Defines relationships between `SalaryRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one staff member
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::StaffId",
        to = "super::staff::Column::StaffId"
    )]
    Staff,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "salary record";

    fn owner_column() -> Column {
        Column::Uid
    }
}

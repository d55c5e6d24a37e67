//! Staff entity - Teaching and non-teaching staff with salary bookkeeping.
//!
//! `staff_id` is the school's own identifier (e.g. `"T-004"`) and is what
//! salary records and class teacher assignments refer to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    /// School-assigned staff identifier
    #[sea_orm(unique)]
    pub staff_id: String,
    pub name: String,
    pub mobile: String,
    pub gmail: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub address: Option<String>,
    pub highest_qualification: Option<String>,
    pub joining_date: Date,
    pub photo_url: Option<String>,
    /// Monthly salary
    pub salary_amount: f64,
    /// Sum of all recorded salary payments
    pub total_paid: f64,
    /// Salary still owed
    pub total_dues: f64,
    pub is_active: bool,
}

/// Defines relationships between Staff and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One staff member has many salary payments
    #[sea_orm(has_many = "super::salary_record::Entity")]
    SalaryRecords,
}

impl Related<super::salary_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalaryRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "staff";

    fn owner_column() -> Column {
        Column::Uid
    }
}

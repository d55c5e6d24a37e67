//! Class entity - A class section such as `"5A"`, with its class teacher and fees.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Class database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    /// Display name, also what `students.class` stores
    pub class_name: String,
    /// `staff.staff_id` of the class teacher
    pub staff_id: Option<String>,
    /// Monthly school fees for the class
    pub school_fees: Option<f64>,
}

/// Defines relationships between Class and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "class";

    fn owner_column() -> Column {
        Column::Uid
    }
}

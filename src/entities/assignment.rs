//! Assignment entity - Which subject is taught in which class, by whom and when.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assignment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    pub class_id: i64,
    pub subject_id: i64,
    /// `staff.staff_id` of the teacher, if assigned
    pub staff_id: Option<String>,
    pub incoming_time: Option<Time>,
    pub outgoing_time: Option<Time>,
}

/// Defines relationships between Assignment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "assignment";

    fn owner_column() -> Column {
        Column::Uid
    }
}

//! Operator entity - Sign-in credential for one school account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operator database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operators")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account identifier stamped on every row the operator creates
    #[sea_orm(unique)]
    pub uid: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Hex SHA-256 of `uid:password`
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

/// `Operator` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

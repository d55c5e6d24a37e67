//! Student entity - One enrolled student of the school.
//!
//! Students reference their class by name rather than by id, and carry twelve
//! monthly fee-status columns (`january` .. `december`) holding free text such
//! as `"Paid"`.

use chrono::Month;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account
    pub uid: String,
    /// Roll number as entered, may contain letters (e.g. `"A-12"`)
    pub roll_number: Option<String>,
    /// Full name
    pub name: String,
    pub mobile: Option<String>,
    pub gmail: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    /// Class name, matched against `classes.class_name`
    pub class: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub aadhar: Option<String>,
    /// `"Male"`, `"Female"` or `"Other"`
    pub gender: Option<String>,
    pub date_of_birth: Option<Date>,
    pub registration_date: Date,
    pub caste: Option<String>,
    pub blood_group: Option<String>,
    pub previous_school_name: Option<String>,
    pub january: Option<String>,
    pub february: Option<String>,
    pub march: Option<String>,
    pub april: Option<String>,
    pub may: Option<String>,
    pub june: Option<String>,
    pub july: Option<String>,
    pub august: Option<String>,
    pub september: Option<String>,
    pub october: Option<String>,
    pub november: Option<String>,
    pub december: Option<String>,
}

impl Model {
    /// Fee status recorded for `month`, if any.
    #[must_use]
    pub fn fee_status(&self, month: Month) -> Option<&str> {
        let status = match month {
            Month::January => &self.january,
            Month::February => &self.february,
            Month::March => &self.march,
            Month::April => &self.april,
            Month::May => &self.may,
            Month::June => &self.june,
            Month::July => &self.july,
            Month::August => &self.august,
            Month::September => &self.september,
            Month::October => &self.october,
            Month::November => &self.november,
            Month::December => &self.december,
        };
        status.as_deref()
    }
}

/// Column holding the fee status for `month`.
#[must_use]
pub const fn fee_status_column(month: Month) -> Column {
    match month {
        Month::January => Column::January,
        Month::February => Column::February,
        Month::March => Column::March,
        Month::April => Column::April,
        Month::May => Column::May,
        Month::June => Column::June,
        Month::July => Column::July,
        Month::August => Column::August,
        Month::September => Column::September,
        Month::October => Column::October,
        Month::November => Column::November,
        Month::December => Column::December,
    }
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many collected fee records
    #[sea_orm(has_many = "super::fee_record::Entity")]
    FeeRecords,
}

impl Related<super::fee_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Owned for Entity {
    const NAME: &'static str = "student";

    fn owner_column() -> Column {
        Column::Uid
    }
}

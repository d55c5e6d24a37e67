//! Attendance sheets
//!
//! One row per class and date. Present and absent roll numbers are stored as
//! comma-joined text; in memory they are normalized into a [`RollSet`]
//! (trimmed, de-duplicated, in roll-number order). A roll number is never
//! both present and absent on the same sheet.

use super::projection::compare_roll_numbers;
use crate::{
    backend::{Backend, Query, fetch, mutation},
    entities::{Attendance, attendance},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::NaiveDate;
use sea_orm::Set;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

/// Normalized set of roll numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollSet(Vec<String>);

impl RollSet {
    /// Parses the stored comma-joined form. Blank entries are dropped.
    #[must_use]
    pub fn parse(stored: Option<&str>) -> Self {
        let mut set = Self::default();
        for roll in stored.unwrap_or_default().split(',') {
            set.add(roll);
        }
        set
    }

    /// Adds a roll number, returning false if it was blank or already there.
    ///
    /// A comma would split the roll in two once stored, so it is rejected.
    pub fn insert(&mut self, roll: &str) -> Result<bool> {
        if roll.contains(',') {
            return Err(Error::validation(format!(
                "Roll number \"{}\" must not contain a comma.",
                roll.trim()
            )));
        }
        Ok(self.add(roll))
    }

    fn add(&mut self, roll: &str) -> bool {
        let roll = roll.trim();
        if roll.is_empty() {
            return false;
        }
        match self
            .0
            .binary_search_by(|r| compare_roll_numbers(r, roll))
        {
            Ok(_) => false,
            Err(at) => {
                self.0.insert(at, roll.to_string());
                true
            }
        }
    }

    /// Removes a roll number, returning whether it was there.
    pub fn remove(&mut self, roll: &str) -> bool {
        let roll = roll.trim();
        self.0
            .binary_search_by(|r| compare_roll_numbers(r, roll))
            .map(|at| self.0.remove(at))
            .is_ok()
    }

    #[must_use]
    pub fn contains(&self, roll: &str) -> bool {
        let roll = roll.trim();
        self.0
            .binary_search_by(|r| compare_roll_numbers(r, roll))
            .is_ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Stored form: comma-joined, or `None` when empty.
    #[must_use]
    pub fn to_stored(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl fmt::Display for RollSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Attendance of one class on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSheet {
    pub class_id: i64,
    pub date: NaiveDate,
    present: RollSet,
    absent: RollSet,
}

impl AttendanceSheet {
    /// An empty sheet.
    #[must_use]
    pub fn new(class_id: i64, date: NaiveDate) -> Self {
        Self {
            class_id,
            date,
            present: RollSet::default(),
            absent: RollSet::default(),
        }
    }

    /// Loads a stored sheet. A roll listed on both sides counts as present.
    #[must_use]
    pub fn from_model(model: &attendance::Model) -> Self {
        let present = RollSet::parse(model.present.as_deref());
        let mut absent = RollSet::parse(model.absent.as_deref());
        for roll in present.iter() {
            absent.remove(roll);
        }
        Self {
            class_id: model.class_id,
            date: model.date,
            present,
            absent,
        }
    }

    /// Marks a roll number present, clearing any absent mark.
    pub fn mark_present(&mut self, roll: &str) -> Result<()> {
        self.present.insert(roll)?;
        self.absent.remove(roll);
        Ok(())
    }

    /// Marks a roll number absent, clearing any present mark.
    pub fn mark_absent(&mut self, roll: &str) -> Result<()> {
        self.absent.insert(roll)?;
        self.present.remove(roll);
        Ok(())
    }

    /// Removes any mark for a roll number.
    pub fn clear(&mut self, roll: &str) {
        self.present.remove(roll);
        self.absent.remove(roll);
    }

    #[must_use]
    pub const fn present(&self) -> &RollSet {
        &self.present
    }

    #[must_use]
    pub const fn absent(&self) -> &RollSet {
        &self.absent
    }
}

async fn find_sheet(
    backend: &Backend,
    session: &SessionContext,
    class_id: i64,
    date: NaiveDate,
) -> Result<Option<attendance::Model>> {
    let query = Query::all()
        .filter_eq(attendance::Column::Uid, session.uid.clone())
        .filter_eq(attendance::Column::ClassId, class_id)
        .filter_eq(attendance::Column::Date, date);
    Ok(fetch::<Attendance>(backend, &query).await?.into_iter().next())
}

/// The stored sheet for a class and date, or an empty one.
pub async fn load_sheet(
    backend: &Backend,
    session: &SessionContext,
    class_id: i64,
    date: NaiveDate,
) -> Result<AttendanceSheet> {
    Ok(find_sheet(backend, session, class_id, date)
        .await?
        .map_or_else(|| AttendanceSheet::new(class_id, date), |m| AttendanceSheet::from_model(&m)))
}

/// Saves a sheet, replacing the stored one for the same class and date.
#[instrument(skip(backend, session, sheet), fields(uid = %session.uid, class_id = sheet.class_id, date = %sheet.date))]
pub async fn save_attendance(
    backend: &Backend,
    session: &SessionContext,
    sheet: &AttendanceSheet,
) -> Result<attendance::Model> {
    let marks = attendance::ActiveModel {
        present: Set(sheet.present.to_stored()),
        absent: Set(sheet.absent.to_stored()),
        ..Default::default()
    };
    match find_sheet(backend, session, sheet.class_id, sheet.date).await? {
        Some(existing) => {
            debug!("Replacing sheet {}", existing.id);
            mutation::update(backend, &session.uid, existing.id, marks).await
        }
        None => {
            let mut model = marks;
            model.uid = Set(session.uid.clone());
            model.class_id = Set(sheet.class_id);
            model.date = Set(sheet.date);
            mutation::create(backend, model).await
        }
    }
}

/// Attendance totals of one roll number.
#[derive(Debug, Clone, PartialEq)]
pub struct RollSummary {
    pub roll_number: String,
    pub present_days: u32,
    pub absent_days: u32,
    /// Present days over marked days, 0-100
    pub percentage: f64,
}

/// Per-roll totals across the given sheets, in roll-number order.
#[must_use]
pub fn attendance_report(sheets: &[attendance::Model]) -> Vec<RollSummary> {
    let mut totals: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for sheet in sheets.iter().map(AttendanceSheet::from_model) {
        for roll in sheet.present.iter() {
            totals.entry(roll.to_string()).or_default().0 += 1;
        }
        for roll in sheet.absent.iter() {
            totals.entry(roll.to_string()).or_default().1 += 1;
        }
    }

    let mut report: Vec<RollSummary> = totals
        .into_iter()
        .map(|(roll_number, (present_days, absent_days))| {
            let marked = f64::from(present_days + absent_days);
            RollSummary {
                roll_number,
                present_days,
                absent_days,
                percentage: f64::from(present_days) * 100.0 / marked,
            }
        })
        .collect();
    report.sort_by(|a, b| compare_roll_numbers(&a.roll_number, &b.roll_number));
    report
}

/// Stored sheets of a class between two dates, inclusive.
pub async fn sheets_between(
    backend: &Backend,
    session: &SessionContext,
    class_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<attendance::Model>> {
    let query = Query::all()
        .filter_eq(attendance::Column::Uid, session.uid.clone())
        .filter_eq(attendance::Column::ClassId, class_id)
        .order_asc(attendance::Column::Date);
    Ok(fetch::<Attendance>(backend, &query)
        .await?
        .into_iter()
        .filter(|s| s.date >= from && s.date <= to)
        .collect())
}

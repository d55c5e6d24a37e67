//! Derived projections - filtered, searched and sorted views of raw lists.
//!
//! All functions here are pure and cheap enough to recompute on every state
//! change for the list sizes a school works with.

use crate::entities::{expense, staff, student};
use chrono::Datelike;
use std::cmp::Ordering;

/// Numeric value of a roll number: its digits read in order, non-digits
/// ignored. Empty or digit-free roll numbers are worth 0.
///
/// `"A-12b3"` → 123, `"IX"` → 0.
#[must_use]
pub fn roll_number_value(roll_number: Option<&str>) -> u64 {
    roll_number
        .unwrap_or_default()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit))
        })
}

/// Ascending by value, with every 0 after every positive value.
#[must_use]
pub fn compare_roll_values(a: u64, b: u64) -> Ordering {
    match (a, b) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        _ => a.cmp(&b),
    }
}

/// Roll-number order for two raw roll numbers, falling back to the text.
#[must_use]
pub fn compare_roll_numbers(a: &str, b: &str) -> Ordering {
    compare_roll_values(roll_number_value(Some(a)), roll_number_value(Some(b)))
        .then_with(|| a.cmp(b))
}

/// Case-insensitive substring match; an empty needle matches everything.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Class selector of the student list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassFilter {
    /// Every class
    #[default]
    All,
    /// Only students whose class name is exactly this
    Named(String),
}

impl ClassFilter {
    /// `"all"` selects every class, anything else one class by name.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    fn matches(&self, class: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => class == Some(name.as_str()),
        }
    }
}

/// Search box and class dropdown of the student list.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Matched case-insensitively against the student's name
    pub search: String,
    /// Class selector
    pub class: ClassFilter,
}

/// Students passing `filter`, in roll-number order.
///
/// Ties (equal roll values, including every roll-less student) are broken by
/// name, case-insensitively, and then by id.
#[must_use]
pub fn project_students(
    students: &[student::Model],
    filter: &StudentFilter,
) -> Vec<student::Model> {
    let mut rows: Vec<_> = students
        .iter()
        .filter(|s| filter.class.matches(s.class.as_deref()))
        .filter(|s| contains_ignore_case(&s.name, &filter.search))
        .map(|s| (roll_number_value(s.roll_number.as_deref()), s))
        .collect();

    rows.sort_by(|(roll_a, a), (roll_b, b)| {
        compare_roll_values(*roll_a, *roll_b)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });

    rows.into_iter().map(|(_, s)| s.clone()).collect()
}

/// Active-status selector of the staff list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaffStatus {
    #[default]
    All,
    Active,
    Inactive,
}

/// Search and status filter of the staff list.
#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    /// Matched against name or staff id
    pub search: String,
    pub status: StaffStatus,
}

/// Staff passing `filter`, by name.
#[must_use]
pub fn project_staff(staff: &[staff::Model], filter: &StaffFilter) -> Vec<staff::Model> {
    let search = filter.search.as_str();
    let mut rows: Vec<_> = staff
        .iter()
        .filter(|s| match filter.status {
            StaffStatus::All => true,
            StaffStatus::Active => s.is_active,
            StaffStatus::Inactive => !s.is_active,
        })
        .filter(|s| contains_ignore_case(&s.name, search) || contains_ignore_case(&s.staff_id, search))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    rows
}

/// Category and month filter of the expense list.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Exact category, case-insensitive
    pub category: Option<String>,
    /// `(year, month)` the expense date must fall in
    pub month: Option<(i32, u32)>,
}

/// Filtered expenses with their sum.
#[derive(Debug, Clone)]
pub struct ExpenseView {
    /// Matching expenses, newest first
    pub rows: Vec<expense::Model>,
    /// Sum of `rows`
    pub total: f64,
}

/// Expenses passing `filter`, newest first, with their total.
#[must_use]
pub fn project_expenses(expenses: &[expense::Model], filter: &ExpenseFilter) -> ExpenseView {
    let mut rows: Vec<_> = expenses
        .iter()
        .filter(|e| {
            filter
                .category
                .as_deref()
                .is_none_or(|category| e.category.eq_ignore_ascii_case(category))
        })
        .filter(|e| {
            filter
                .month
                .is_none_or(|(year, month)| e.date.year() == year && e.date.month() == month)
        })
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    let total = rows.iter().map(|e| e.amount).sum();
    ExpenseView { rows, total }
}

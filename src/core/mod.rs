//! Business logic per record type, independent of any screen.
//!
//! Every write goes through the mutation gateway so that committed changes
//! reach the change feed.

pub mod attendance;
pub mod class;
pub mod dashboard;
pub mod expense;
pub mod fee_type;
pub mod fees;
pub mod profile;
pub mod projection;
pub mod staff;
pub mod student;

/// Trims an optional text field and maps blank input to `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rejects amounts that are not strictly positive.
pub(crate) fn require_positive(amount: f64) -> crate::errors::Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(crate::errors::Error::validation(
            "Please enter a valid amount.",
        ))
    }
}

//! Explicit session context handed to every screen and core operation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The signed-in operator a screen acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Account identifier stamped on every row this session writes
    pub uid: String,
    /// Email the operator signed in with
    pub email: String,
    /// Opaque session token
    pub token: Uuid,
    /// When the session was opened
    pub signed_in_at: DateTime<Utc>,
}

impl SessionContext {
    /// Opens a fresh session for `uid`.
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            token: Uuid::new_v4(),
            signed_in_at: Utc::now(),
        }
    }
}

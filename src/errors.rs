//! Unified error type for the console core.
//!
//! Screens distinguish three user-facing failure families: `Query` (a read
//! failed and the list cannot be shown), `Mutation` (a write failed and a
//! banner is raised) and `Validation` (the input was rejected before any
//! backend call). The remaining variants cover start-up and plumbing.

use thiserror::Error;

/// Every failure the crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// A read against a table failed.
    #[error("Failed to load {table}: {message}")]
    Query {
        /// Table the read targeted
        table: String,
        /// Backend error text
        message: String,
    },

    /// A write against a table failed.
    #[error("Failed to save {table}: {message}")]
    Mutation {
        /// Table the write targeted
        table: String,
        /// Backend error text
        message: String,
    },

    /// Client-side validation rejected the input before any backend call.
    #[error("{message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    #[error("Sign-in failed: {message}")]
    Auth { message: String },

    #[error("You must be signed in to perform this action")]
    NotSignedIn,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True when the failure happened before anything reached the backend.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

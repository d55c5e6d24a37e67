//! Backend layer - the relational store plus its change feed.
//!
//! A [`Backend`] is cheap to clone; every console session and every mounted
//! screen of a process shares one, so a write made through one session is
//! observed by the listeners of all the others.

/// Change notifications published after every committed write
pub mod feed;
/// Create, update and delete operations
pub mod mutation;
/// Read queries
pub mod query;

pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, RowFilter, Subscription};
pub use query::{Query, fetch, fetch_by_id};

use crate::config::database::{create_connection, create_tables};
use crate::errors::Result;
use sea_orm::{DatabaseConnection, EntityName, EntityTrait};
use std::sync::Arc;
use tracing::info;

/// Shared handle to the database connection and change feed.
#[derive(Debug, Clone)]
pub struct Backend {
    db: Arc<DatabaseConnection>,
    feed: ChangeFeed,
}

impl Backend {
    /// Wraps an existing connection with a fresh change feed.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            feed: ChangeFeed::new(),
        }
    }

    /// Connects to `DATABASE_URL` and ensures every table exists.
    pub async fn connect() -> Result<Self> {
        let db = create_connection().await?;
        create_tables(&db).await?;
        info!("Backend ready");
        Ok(Self::new(db))
    }

    /// The underlying database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Takes the connection back, e.g. to read a mock transaction log.
    ///
    /// `None` while other clones of this backend are alive.
    #[cfg(test)]
    pub(crate) fn into_connection(self) -> Option<DatabaseConnection> {
        Arc::try_unwrap(self.db).ok()
    }

    /// The change feed every committed write is published to.
    #[must_use]
    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

/// Table name of an entity, as used by the change feed and error messages.
#[must_use]
pub fn table_name<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_into_connection_needs_the_last_handle() {
        let backend = Backend::new(MockDatabase::new(DatabaseBackend::Sqlite).into_connection());
        let screen_handle = backend.clone();

        assert!(backend.into_connection().is_none());
        let log = screen_handle.into_connection().unwrap().into_transaction_log();
        assert!(log.is_empty());
    }
}

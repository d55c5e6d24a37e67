//! Database configuration module.
//!
//! Handles the backend connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    Assignment, Attendance, Class, Expense, FeeRecord, FeeType, Operator, OwnerProfile,
    SalaryRecord, Staff, Student, Subject,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Default location of the local `SQLite` file.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/school_desk.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table the console works with, parents before children.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Operator).await?;
    create_table(db, &schema, OwnerProfile).await?;
    create_table(db, &schema, Student).await?;
    create_table(db, &schema, FeeRecord).await?;
    create_table(db, &schema, Staff).await?;
    create_table(db, &schema, SalaryRecord).await?;
    create_table(db, &schema, Class).await?;
    create_table(db, &schema, Subject).await?;
    create_table(db, &schema, Assignment).await?;
    create_table(db, &schema, Attendance).await?;
    create_table(db, &schema, Expense).await?;
    create_table(db, &schema, FeeType).await?;

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{StaffModel, StudentModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<StudentModel> = Student::find().limit(1).all(&db).await?;
        let _: Vec<StaffModel> = Staff::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}

//! Mutation gateway.
//!
//! Writes never patch any screen's list directly. Each committed write
//! publishes a change event and the screens watching the table refetch.

use super::{Backend, ChangeEvent, ChangeKind, table_name};
use crate::entities::Owned;
use crate::errors::{Error, Result};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IdenStatic,
    IntoActiveModel, Iterable, PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, Value,
};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use tracing::{info, instrument, warn};

type ModelOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;

/// Maps a failed write against `E` to a [`Error::Mutation`].
pub(crate) fn failure<E: EntityTrait>(error: &DbErr) -> Error {
    warn!("Write to {} failed: {}", table_name::<E>(), error);
    Error::Mutation {
        table: table_name::<E>(),
        message: error.to_string(),
    }
}

/// Publishes a change for a table after its write has committed.
pub fn announce<E: EntityTrait>(backend: &Backend, kind: ChangeKind, record: JsonValue) {
    backend
        .feed()
        .publish(ChangeEvent::new(table_name::<E>(), kind, record));
}

/// Inserts a new row and returns it as stored.
#[instrument(skip_all, fields(table = %table_name::<A::Entity>()))]
pub async fn create<A>(backend: &Backend, model: A) -> Result<ModelOf<A>>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + 'static,
    ModelOf<A>: IntoActiveModel<A> + Serialize,
{
    let created = model
        .insert(backend.connection())
        .await
        .map_err(|e| failure::<A::Entity>(&e))?;
    announce::<A::Entity>(backend, ChangeKind::Insert, serde_json::to_value(&created)?);
    info!("Row created");
    Ok(created)
}

fn not_found<E: Owned>(id: i64) -> Error {
    Error::NotFound {
        entity: E::NAME,
        id: id.to_string(),
    }
}

/// Updates `owner`'s row with primary key `id` using the `Set` fields of
/// `changes`. A row owned by another account counts as missing.
#[instrument(skip(backend, owner, changes), fields(table = %table_name::<A::Entity>()))]
pub async fn update<A>(backend: &Backend, owner: &str, id: i64, mut changes: A) -> Result<ModelOf<A>>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + 'static,
    A::Entity: Owned,
    ModelOf<A>: IntoActiveModel<A> + Serialize,
{
    for key in <<A::Entity as EntityTrait>::PrimaryKey as Iterable>::iter() {
        changes.set(key.into_column(), Value::from(id));
    }
    let updated = <A::Entity as EntityTrait>::update(changes)
        .filter(<A::Entity as Owned>::owner_column().eq(owner))
        .exec(backend.connection())
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                warn!("No row {} for this account", id);
                not_found::<A::Entity>(id)
            }
            e => failure::<A::Entity>(&e),
        })?;
    announce::<A::Entity>(backend, ChangeKind::Update, serde_json::to_value(&updated)?);
    info!("Row updated");
    Ok(updated)
}

/// Deletes `owner`'s row with primary key `id`.
///
/// Returns [`Error::NotFound`] when no such row belongs to `owner`.
#[instrument(skip(backend, owner), fields(table = %table_name::<E>()))]
pub async fn delete<E>(backend: &Backend, owner: &str, id: i64) -> Result<u64>
where
    E: Owned,
    i64: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let result = E::delete_by_id(id)
        .filter(E::owner_column().eq(owner))
        .exec(backend.connection())
        .await
        .map_err(|e| failure::<E>(&e))?;
    if result.rows_affected == 0 {
        return Err(not_found::<E>(id));
    }
    announce::<E>(backend, ChangeKind::Delete, json!({ "id": id }));
    info!("Deleted {} rows", result.rows_affected);
    Ok(result.rows_affected)
}

/// Deletes every row of `owner` where `column = value`, returning how many
/// went away.
#[instrument(skip(backend, owner, column, value), fields(table = %table_name::<E>(), column = column.as_str()))]
pub async fn delete_where<E, V>(
    backend: &Backend,
    owner: &str,
    column: E::Column,
    value: V,
) -> Result<u64>
where
    E: Owned,
    V: Into<Value> + Into<JsonValue> + Clone,
{
    let result = E::delete_many()
        .filter(E::owner_column().eq(owner))
        .filter(column.eq(Into::<Value>::into(value.clone())))
        .exec(backend.connection())
        .await
        .map_err(|e| failure::<E>(&e))?;
    if result.rows_affected > 0 {
        let mut record = serde_json::Map::new();
        record.insert(column.as_str().to_owned(), value.into());
        announce::<E>(backend, ChangeKind::Delete, JsonValue::Object(record));
    }
    info!("Deleted {} rows", result.rows_affected);
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{expense, Expense};
    use crate::test_utils::setup_test_backend;
    use chrono::NaiveDate;
    use sea_orm::Set;

    fn stationery(uid: &str) -> expense::ActiveModel {
        expense::ActiveModel {
            uid: Set(uid.to_string()),
            date: Set(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            category: Set("Stationery".to_string()),
            notes: Set(None),
            amount: Set(450.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_publishes_insert() -> Result<()> {
        let backend = setup_test_backend().await?;
        let mut changes = backend.feed().subscribe("expenses", None);

        let created = create(&backend, stationery("school-1")).await?;

        let event = changes.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.record["id"], json!(created.id));
        assert_eq!(event.record["category"], json!("Stationery"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_sets_only_changed_fields() -> Result<()> {
        let backend = setup_test_backend().await?;
        let created = create(&backend, stationery("school-1")).await?;

        let changes = expense::ActiveModel {
            amount: Set(500.0),
            ..Default::default()
        };
        let updated = update(&backend, "school-1", created.id, changes).await?;

        assert_eq!(updated.amount, 500.0);
        assert_eq!(updated.category, "Stationery");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() -> Result<()> {
        let backend = setup_test_backend().await?;
        let changes = expense::ActiveModel {
            amount: Set(1.0),
            ..Default::default()
        };

        let result = update(&backend, "school-1", 404, changes).await;

        assert!(matches!(result, Err(Error::NotFound { entity: "expense", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_writes_never_touch_another_account() -> Result<()> {
        let backend = setup_test_backend().await?;
        let created = create(&backend, stationery("school-1")).await?;
        let mut changes_feed = backend.feed().subscribe("expenses", None);

        let changes = expense::ActiveModel {
            amount: Set(1.0),
            ..Default::default()
        };
        let updated = update(&backend, "school-2", created.id, changes).await;
        let deleted = delete::<Expense>(&backend, "school-2", created.id).await;
        let swept =
            delete_where::<Expense, _>(&backend, "school-2", expense::Column::Category, "Stationery")
                .await?;

        assert!(matches!(updated, Err(Error::NotFound { .. })));
        assert!(matches!(deleted, Err(Error::NotFound { .. })));
        assert_eq!(swept, 0);
        let stored = Expense::find_by_id(created.id)
            .one(backend.connection())
            .await?
            .unwrap();
        assert_eq!(stored, created);
        let quiet =
            tokio::time::timeout(std::time::Duration::from_millis(50), changes_feed.next()).await;
        assert!(quiet.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_publishes_only_when_rows_removed() -> Result<()> {
        let backend = setup_test_backend().await?;
        let created = create(&backend, stationery("school-1")).await?;
        let mut changes = backend.feed().subscribe("expenses", None);

        assert!(matches!(
            delete::<Expense>(&backend, "school-1", 999).await,
            Err(Error::NotFound { .. })
        ));
        assert_eq!(delete::<Expense>(&backend, "school-1", created.id).await?, 1);

        let event = changes.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.record, json!({ "id": created.id }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_where_removes_matching_rows() -> Result<()> {
        let backend = setup_test_backend().await?;
        create(&backend, stationery("school-1")).await?;
        create(&backend, stationery("school-1")).await?;
        create(&backend, stationery("school-2")).await?;

        let removed = delete_where::<Expense, _>(
            &backend,
            "school-1",
            expense::Column::Category,
            "Stationery".to_string(),
        )
        .await?;

        assert_eq!(removed, 2);
        assert_eq!(Expense::find().all(backend.connection()).await?.len(), 1);
        Ok(())
    }
}

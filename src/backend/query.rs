//! Fetch gateway.
//!
//! Every screen loads its whole table (scoped by equality filters) on each
//! fetch; there is no pagination and no partial loading.

use super::{Backend, table_name};
use crate::errors::{Error, Result};
use sea_orm::{
    ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Select, Value,
};
use tracing::{debug, instrument};

/// A read against one table: equality filters plus an optional ordering.
#[derive(Debug, Clone)]
pub struct Query<E: EntityTrait> {
    filters: Vec<(E::Column, Value)>,
    order: Option<(E::Column, Order)>,
}

impl<E: EntityTrait> Default for Query<E> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order: None,
        }
    }
}

impl<E: EntityTrait> Query<E> {
    /// Every row of the table, in backend order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Keeps rows where `column = value`.
    #[must_use]
    pub fn filter_eq(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    /// Orders by `column` ascending.
    #[must_use]
    pub fn order_asc(mut self, column: E::Column) -> Self {
        self.order = Some((column, Order::Asc));
        self
    }

    /// Orders by `column` descending.
    #[must_use]
    pub fn order_desc(mut self, column: E::Column) -> Self {
        self.order = Some((column, Order::Desc));
        self
    }

    /// Builds the `SeaORM` select for this query.
    #[must_use]
    pub fn select(&self) -> Select<E> {
        let mut select = E::find();
        for (column, value) in &self.filters {
            select = select.filter(column.eq(value.clone()));
        }
        if let Some((column, order)) = &self.order {
            select = select.order_by(*column, order.clone());
        }
        select
    }
}

/// Loads every row matching `query`.
///
/// # Errors
/// Returns [`Error::Query`] carrying the backend error text.
#[instrument(skip_all, fields(table = %table_name::<E>()))]
pub async fn fetch<E>(backend: &Backend, query: &Query<E>) -> Result<Vec<E::Model>>
where
    E: EntityTrait,
{
    let rows = query
        .select()
        .all(backend.connection())
        .await
        .map_err(|e| Error::Query {
            table: table_name::<E>(),
            message: e.to_string(),
        })?;
    debug!("Fetched {} rows", rows.len());
    Ok(rows)
}

/// Loads one row by primary key, `None` when it does not exist.
#[instrument(skip(backend), fields(table = %table_name::<E>()))]
pub async fn fetch_by_id<E>(backend: &Backend, id: i64) -> Result<Option<E::Model>>
where
    E: EntityTrait,
    i64: Into<<E::PrimaryKey as sea_orm::PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .one(backend.connection())
        .await
        .map_err(|e| Error::Query {
            table: table_name::<E>(),
            message: e.to_string(),
        })
}

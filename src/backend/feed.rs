//! In-process change feed.
//!
//! One broadcast channel per table. Every committed insert, update or delete
//! is published as a [`ChangeEvent`] carrying the affected row as JSON, and
//! each [`Subscription`] receives the events of exactly one table, optionally
//! narrowed by a [`RowFilter`].

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{trace, warn};

const CHANNEL_CAPACITY: usize = 64;

/// What happened to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A row was inserted
    Insert,
    /// A row was updated
    Update,
    /// One or more rows were deleted
    Delete,
    /// The subscriber fell behind and some events were dropped
    Missed,
}

/// One committed row change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Table the change happened in
    pub table: String,
    /// Kind of change
    pub kind: ChangeKind,
    /// The row after the change; for deletes only the matched key columns
    pub record: JsonValue,
}

impl ChangeEvent {
    /// Creates an event for `table`.
    pub fn new(table: impl Into<String>, kind: ChangeKind, record: JsonValue) -> Self {
        Self {
            table: table.into(),
            kind,
            record,
        }
    }
}

/// `column = value` restriction on the events a subscription receives.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    column: String,
    value: JsonValue,
}

impl RowFilter {
    /// Matches rows whose `column` equals `value`.
    pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether `record` passes the filter.
    ///
    /// Payloads that do not carry the column at all (bulk deletes keyed by
    /// another column) are let through.
    #[must_use]
    pub fn matches(&self, record: &JsonValue) -> bool {
        record
            .get(&self.column)
            .is_none_or(|value| value == &self.value)
    }
}

/// Publisher side of the feed, shared by every clone of a backend.
#[derive(Debug, Clone, Default)]
pub struct ChangeFeed {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>>,
}

impl ChangeFeed {
    /// Creates an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, table: &str) -> broadcast::Sender<ChangeEvent> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(table.to_owned())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Opens a standing subscription to the changes of `table`.
    #[must_use]
    pub fn subscribe(&self, table: &str, filter: Option<RowFilter>) -> Subscription {
        Subscription {
            table: table.to_owned(),
            filter,
            receiver: self.sender(table).subscribe(),
        }
    }

    /// Publishes `event` and returns how many subscriptions it reached.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let sender = self.sender(&event.table);
        trace!(table = %event.table, kind = ?event.kind, "publishing change");
        // No subscribers is not an error: nobody has the table on screen.
        sender.send(event).unwrap_or(0)
    }

    /// Number of live subscriptions to `table`.
    #[must_use]
    pub fn subscriber_count(&self, table: &str) -> usize {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.get(table).map_or(0, broadcast::Sender::receiver_count)
    }
}

/// Receiving side of one table's changes.
#[derive(Debug)]
pub struct Subscription {
    table: String,
    filter: Option<RowFilter>,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Table this subscription watches.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Waits for the next matching change.
    ///
    /// Returns `None` once the feed is gone. After falling behind, a single
    /// [`ChangeKind::Missed`] event stands in for everything that was dropped.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self
                        .filter
                        .as_ref()
                        .is_none_or(|filter| filter.matches(&event.record))
                    {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(table = %self.table, skipped, "change subscription lagged");
                    return Some(ChangeEvent::new(
                        self.table.clone(),
                        ChangeKind::Missed,
                        JsonValue::Null,
                    ));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscription_receives_its_table_only() {
        let feed = ChangeFeed::new();
        let mut students = feed.subscribe("students", None);

        feed.publish(ChangeEvent::new("staff", ChangeKind::Insert, json!({"id": 1})));
        feed.publish(ChangeEvent::new("students", ChangeKind::Delete, json!({"id": 2})));

        let event = students.next().await.unwrap();
        assert_eq!(event.table, "students");
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.record, json!({"id": 2}));
    }

    #[tokio::test]
    async fn test_row_filter_skips_other_rows() {
        let feed = ChangeFeed::new();
        let mut history = feed.subscribe(
            "salary_records",
            Some(RowFilter::eq("staff_id", "T-01")),
        );

        feed.publish(ChangeEvent::new(
            "salary_records",
            ChangeKind::Insert,
            json!({"id": 1, "staff_id": "T-02"}),
        ));
        feed.publish(ChangeEvent::new(
            "salary_records",
            ChangeKind::Insert,
            json!({"id": 2, "staff_id": "T-01"}),
        ));

        let event = history.next().await.unwrap();
        assert_eq!(event.record["id"], json!(2));
    }

    #[test]
    fn test_row_filter_lets_keyless_payloads_through() {
        let filter = RowFilter::eq("staff_id", "T-01");
        assert!(filter.matches(&json!({"id": 9})));
        assert!(!filter.matches(&json!({"staff_id": "T-09"})));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_reaches_nobody() {
        let feed = ChangeFeed::new();
        let reached = feed.publish(ChangeEvent::new("expenses", ChangeKind::Insert, json!({})));
        assert_eq!(reached, 0);
    }

    #[tokio::test]
    async fn test_lagging_subscription_reports_missed() {
        let feed = ChangeFeed::new();
        let mut slow = feed.subscribe("expenses", None);
        for id in 0..(CHANNEL_CAPACITY + 5) {
            feed.publish(ChangeEvent::new("expenses", ChangeKind::Insert, json!({"id": id})));
        }

        let event = slow.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Missed);
    }

    #[test]
    fn test_subscriber_count_tracks_drops() {
        let feed = ChangeFeed::new();
        let first = feed.subscribe("classes", None);
        let second = feed.subscribe("classes", None);
        assert_eq!(feed.subscriber_count("classes"), 2);
        drop(first);
        assert_eq!(feed.subscriber_count("classes"), 1);
        drop(second);
        assert_eq!(feed.subscriber_count("classes"), 0);
    }
}

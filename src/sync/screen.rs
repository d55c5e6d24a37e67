//! Generic data binding for one record-management screen.
//!
//! A [`Screen`] fetches its table on mount, keeps one change listener per
//! watched table, and refetches the whole list whenever any of them fires.
//! Writes never touch the list directly; they only raise banners and wait for
//! the resulting change event.

use super::state::ViewState;
use crate::{
    backend::{Backend, Query, RowFilter, query, table_name},
    errors::Result,
    session::SessionContext,
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// One table a screen listens to.
#[derive(Debug, Clone)]
pub struct Watch {
    /// Table name
    pub table: String,
    /// Optional row restriction (e.g. one staff member's payments)
    pub filter: Option<RowFilter>,
}

impl Watch {
    /// Every change of the entity's table.
    #[must_use]
    pub fn table<E: EntityTrait>() -> Self {
        Self {
            table: table_name::<E>(),
            filter: None,
        }
    }

    /// Only changes whose row matches `filter`.
    #[must_use]
    pub fn filtered<E: EntityTrait>(filter: RowFilter) -> Self {
        Self {
            table: table_name::<E>(),
            filter: Some(filter),
        }
    }
}

/// What to load and what to listen to.
#[derive(Debug, Clone)]
pub struct ScreenSetup<E: EntityTrait> {
    /// Name used in logs
    pub name: &'static str,
    /// Read issued on mount and on every change
    pub query: Query<E>,
    /// Tables whose changes trigger a refetch
    pub watches: Vec<Watch>,
    /// Banner lifetime
    pub banner_ttl: Duration,
}

struct Binding<E: EntityTrait> {
    name: &'static str,
    backend: Backend,
    query: Query<E>,
    state: RwLock<ViewState<E::Model>>,
    revision: watch::Sender<u64>,
}

impl<E> Binding<E>
where
    E: EntityTrait,
    E::Model: Clone + Send + Sync + 'static,
{
    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    // Concurrent refetches are not sequenced; the last one to finish wins.
    async fn refetch(&self) {
        let result = query::fetch(&self.backend, &self.query).await;
        if let Err(e) = &result {
            warn!(screen = self.name, "Refetch failed: {}", e);
        }
        self.state.write().await.apply_fetch(result);
        self.bump();
    }
}

/// A mounted screen: state, listeners and the session it acts for.
pub struct Screen<E: EntityTrait> {
    binding: Arc<Binding<E>>,
    session: SessionContext,
    listeners: Vec<JoinHandle<()>>,
}

impl<E> Screen<E>
where
    E: EntityTrait,
    E::Model: Clone + Send + Sync + 'static,
{
    /// Mounts the screen: loads the list and starts listening.
    pub async fn mount(backend: &Backend, session: &SessionContext, setup: ScreenSetup<E>) -> Self {
        let (revision, _) = watch::channel(0);
        let binding = Arc::new(Binding {
            name: setup.name,
            backend: backend.clone(),
            query: setup.query,
            state: RwLock::new(ViewState::new(setup.banner_ttl)),
            revision,
        });

        binding.state.write().await.begin_load();
        binding.bump();

        // Subscribe before the first fetch so writes committed during it still refetch.
        let subscriptions: Vec<_> = setup
            .watches
            .iter()
            .map(|w| backend.feed().subscribe(&w.table, w.filter.clone()))
            .collect();

        binding.refetch().await;

        let listeners = subscriptions
            .into_iter()
            .map(|mut subscription| {
                let binding = Arc::clone(&binding);
                tokio::spawn(async move {
                    while let Some(event) = subscription.next().await {
                        trace!(
                            screen = binding.name,
                            table = %event.table,
                            kind = ?event.kind,
                            "change received"
                        );
                        binding.refetch().await;
                    }
                    debug!(screen = binding.name, "change feed closed");
                })
            })
            .collect::<Vec<_>>();

        info!(
            screen = setup.name,
            listeners = listeners.len(),
            "Screen mounted"
        );
        Self {
            binding,
            session: session.clone(),
            listeners,
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> ViewState<E::Model> {
        self.binding.state.read().await.clone()
    }

    /// Snapshot of the raw list.
    pub async fn records(&self) -> Vec<E::Model> {
        self.binding.state.read().await.records().to_vec()
    }

    /// Receiver bumped after every state change.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.binding.revision.subscribe()
    }

    /// Reloads the list now.
    pub async fn refetch(&self) {
        self.binding.refetch().await;
    }

    /// Session the screen acts for.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Backend the screen reads from.
    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.binding.backend
    }

    /// Number of live change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| !l.is_finished()).count()
    }

    /// Turns the outcome of a write into a banner and hands it back.
    ///
    /// Success shows `success_text`; any failure (validation included) shows
    /// the error text. The list itself is never touched.
    pub async fn report<T>(&self, result: Result<T>, success_text: &str) -> Result<T> {
        let now = Instant::now();
        {
            let mut state = self.binding.state.write().await;
            match &result {
                Ok(_) => state.succeed(success_text, now),
                Err(e) => state.fail(e.to_string(), now),
            }
        }
        self.binding.bump();
        result
    }

    /// Opens the view/edit modal for `record`.
    pub async fn select(&self, record: E::Model) {
        self.binding.state.write().await.select(record);
        self.binding.bump();
    }

    /// Closes the view/edit modal.
    pub async fn clear_selection(&self) {
        self.binding.state.write().await.clear_selection();
        self.binding.bump();
    }

    /// Drops the banner if it has outlived its timeout.
    pub async fn dismiss_expired_banner(&self) {
        self.binding
            .state
            .write()
            .await
            .dismiss_expired(Instant::now());
        self.binding.bump();
    }

    /// Tears down every listener and waits until they are gone.
    pub async fn unmount(mut self) {
        let listeners = std::mem::take(&mut self.listeners);
        for listener in &listeners {
            listener.abort();
        }
        for listener in listeners {
            let _ = listener.await;
        }
        info!(screen = self.binding.name, "Screen unmounted");
    }
}

impl<E: EntityTrait> Drop for Screen<E> {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::fees::collect_fee;
    use crate::core::student::{self, StudentForm};
    use crate::entities::{Student, student as student_entity};
    use crate::errors::Error;
    use crate::sync::state::BannerKind;
    use crate::test_utils::{
        create_test_student, init_test_tracing, setup_test_backend, test_session,
    };
    use chrono::Month;

    const TTL: Duration = Duration::from_secs(5);

    fn students_setup(session: &SessionContext) -> ScreenSetup<Student> {
        ScreenSetup {
            name: "students",
            query: Query::all()
                .filter_eq(student_entity::Column::Uid, session.uid.clone())
                .order_asc(student_entity::Column::Name),
            watches: vec![Watch::table::<Student>()],
            banner_ttl: TTL,
        }
    }

    async fn wait_for_len(screen: &Screen<Student>, len: usize) {
        let mut changes = screen.changes();
        tokio::time::timeout(Duration::from_secs(2), async {
            while screen.records().await.len() != len {
                changes.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_mount_loads_rows() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        create_test_student(&backend, &session, "Ann", "5A", "3").await?;

        let screen = Screen::mount(&backend, &session, students_setup(&session)).await;

        let state = screen.state().await;
        assert!(!state.is_loading());
        assert_eq!(state.records().len(), 1);
        assert_eq!(screen.listener_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_from_other_session_reaches_mounted_screen() -> Result<()> {
        init_test_tracing();
        let backend = setup_test_backend().await?;
        let session_a = test_session();
        let session_b = SessionContext::new(session_a.uid.clone(), "second-desk@example.org");
        create_test_student(&backend, &session_a, "Ann", "5A", "3").await?;

        let screen_b = Screen::mount(&backend, &session_b, students_setup(&session_b)).await;
        assert_eq!(screen_b.records().await.len(), 1);

        create_test_student(&backend, &session_a, "Bo", "5B", "").await?;

        wait_for_len(&screen_b, 2).await;
        let names: Vec<_> = screen_b.records().await.into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Ann", "Bo"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_mutation_raises_banner_and_keeps_list() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        create_test_student(&backend, &session, "Ann", "5A", "3").await?;
        let screen = Screen::mount(&backend, &session, students_setup(&session)).await;

        let form = StudentForm {
            name: "Ghost".to_string(),
            ..StudentForm::default()
        };
        let result = screen
            .report(
                student::update_student(&backend, &session, 999, form).await,
                "Student updated successfully.",
            )
            .await;

        assert!(matches!(result, Err(Error::NotFound { entity: "student", .. })));
        let state = screen.state().await;
        assert_eq!(state.records().len(), 1);
        assert_eq!(state.records()[0].name, "Ann");
        let banner = state.banner_at(Instant::now()).unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
        Ok(())
    }

    #[tokio::test]
    async fn test_reported_delete_refetches_and_cascades() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        let ann = create_test_student(&backend, &session, "Ann", "5A", "3").await?;
        collect_fee(&backend, &session, ann.id, Month::April, 500.0, None).await?;
        let screen = Screen::mount(&backend, &session, students_setup(&session)).await;

        let removed = screen
            .report(
                student::delete_student(&backend, &session, ann.id).await,
                "Student record deleted successfully.",
            )
            .await?;

        assert_eq!(removed, 1);
        assert!(student::fee_history(&backend, &session, ann.id).await?.is_empty());
        wait_for_len(&screen, 0).await;
        let state = screen.state().await;
        assert_eq!(
            state.banner_at(Instant::now()).unwrap().kind,
            BannerKind::Success
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unmount_releases_subscriptions() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        let first = Screen::mount(&backend, &session, students_setup(&session)).await;
        let second = Screen::mount(&backend, &session, students_setup(&session)).await;
        assert_eq!(backend.feed().subscriber_count("students"), 2);

        first.unmount().await;
        assert_eq!(backend.feed().subscriber_count("students"), 1);
        second.unmount().await;
        assert_eq!(backend.feed().subscriber_count("students"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_selection_round_trip() -> Result<()> {
        let backend = setup_test_backend().await?;
        let session = test_session();
        let ann = create_test_student(&backend, &session, "Ann", "5A", "3").await?;
        let screen = Screen::mount(&backend, &session, students_setup(&session)).await;

        screen.select(ann.clone()).await;
        assert_eq!(screen.state().await.selected(), Some(&ann));
        screen.clear_selection().await;
        assert!(screen.state().await.selected().is_none());
        Ok(())
    }
}

//! View-state store for one mounted screen.
//!
//! Pure state machine: the screen feeds it fetch results and mutation
//! outcomes, observers read snapshots. Nothing here touches the backend.

use crate::errors::Result;
use std::time::{Duration, Instant};

/// Tone of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// The last action succeeded
    Success,
    /// The last action failed
    Error,
}

/// Transient message shown after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Success or failure
    pub kind: BannerKind,
    /// Text shown to the operator
    pub text: String,
    shown_at: Instant,
}

impl Banner {
    /// Whether the banner is still visible at `now` given its lifetime.
    #[must_use]
    pub fn is_visible(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) < ttl
    }
}

/// Everything a list screen renders from.
#[derive(Debug, Clone)]
pub struct ViewState<R> {
    records: Vec<R>,
    loading: bool,
    error: Option<String>,
    banner: Option<Banner>,
    banner_ttl: Duration,
    selected: Option<R>,
}

impl<R: Clone> ViewState<R> {
    /// Empty, idle state whose banners last `banner_ttl`.
    #[must_use]
    pub const fn new(banner_ttl: Duration) -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            error: None,
            banner: None,
            banner_ttl,
            selected: None,
        }
    }

    /// `mount → loading`
    pub const fn begin_load(&mut self) {
        self.loading = true;
    }

    /// `fetch success → populated`, `fetch failure → error`.
    ///
    /// A failed fetch keeps whatever list was loaded before.
    pub fn apply_fetch(&mut self, result: Result<Vec<R>>) {
        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Raises a success banner.
    pub fn succeed(&mut self, text: impl Into<String>, now: Instant) {
        self.banner = Some(Banner {
            kind: BannerKind::Success,
            text: text.into(),
            shown_at: now,
        });
    }

    /// Raises an error banner; the list is left as it is.
    pub fn fail(&mut self, text: impl Into<String>, now: Instant) {
        self.banner = Some(Banner {
            kind: BannerKind::Error,
            text: text.into(),
            shown_at: now,
        });
    }

    /// The banner if it has not expired at `now`.
    #[must_use]
    pub fn banner_at(&self, now: Instant) -> Option<&Banner> {
        self.banner
            .as_ref()
            .filter(|banner| banner.is_visible(now, self.banner_ttl))
    }

    /// Drops the banner once it has expired.
    pub fn dismiss_expired(&mut self, now: Instant) {
        if self.banner_at(now).is_none() {
            self.banner = None;
        }
    }

    /// Marks a record as the one being viewed or edited.
    pub fn select(&mut self, record: R) {
        self.selected = Some(record);
    }

    /// Closes the view/edit modal.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Raw list as last fetched.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Whether a fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Page-level error of the last fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Record selected for view/edit.
    #[must_use]
    pub const fn selected(&self) -> Option<&R> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;

    const TTL: Duration = Duration::from_secs(5);

    fn query_failure() -> Error {
        Error::Query {
            table: "students".to_string(),
            message: "permission denied".to_string(),
        }
    }

    #[test]
    fn test_load_cycle() {
        let mut state: ViewState<&str> = ViewState::new(TTL);
        state.begin_load();
        assert!(state.is_loading());

        state.apply_fetch(Ok(vec!["Ann", "Bo"]));

        assert!(!state.is_loading());
        assert_eq!(state.records(), ["Ann", "Bo"]);
        assert!(state.error().is_none());
    }

    #[test]
    fn test_fetch_failure_keeps_previous_list() {
        let mut state = ViewState::new(TTL);
        state.apply_fetch(Ok(vec![1, 2, 3]));
        state.begin_load();

        state.apply_fetch(Err(query_failure()));

        assert!(!state.is_loading());
        assert_eq!(state.records(), [1, 2, 3]);
        assert!(state.error().unwrap().contains("permission denied"));
    }

    #[test]
    fn test_successful_fetch_clears_error() {
        let mut state: ViewState<i32> = ViewState::new(TTL);
        state.apply_fetch(Err(query_failure()));
        state.apply_fetch(Ok(vec![7]));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failed_mutation_leaves_list_unchanged() {
        let now = Instant::now();
        let mut state = ViewState::new(TTL);
        state.apply_fetch(Ok(vec!["Ann"]));

        state.fail("Error deleting student: locked", now);

        assert_eq!(state.records(), ["Ann"]);
        let banner = state.banner_at(now).unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
    }

    #[test]
    fn test_banner_expires_after_ttl() {
        let now = Instant::now();
        let mut state: ViewState<i32> = ViewState::new(TTL);
        state.succeed("Student added successfully.", now);

        assert!(state.banner_at(now + Duration::from_secs(4)).is_some());
        assert!(state.banner_at(now + Duration::from_secs(5)).is_none());

        state.dismiss_expired(now + Duration::from_secs(1));
        assert!(state.banner_at(now).is_some());
        state.dismiss_expired(now + Duration::from_secs(6));
        assert!(state.banner_at(now).is_none());
    }

    #[test]
    fn test_selection() {
        let mut state = ViewState::new(TTL);
        state.select("Cy");
        assert_eq!(state.selected(), Some(&"Cy"));
        state.clear_selection();
        assert!(state.selected().is_none());
    }
}

//! Client-side data synchronization.
//!
//! [`screen::Screen`] binds a table to a [`state::ViewState`]: fetch on
//! mount, refetch on every change notification, banners for writes.

/// Full-viewport embed of an external page
pub mod embed;
/// Generic data binding
pub mod screen;
/// Per-entity screen presets
pub mod screens;
/// View-state store
pub mod state;

pub use screen::{Screen, ScreenSetup, Watch};
pub use state::{Banner, BannerKind, ViewState};

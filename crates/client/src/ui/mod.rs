//! Terminal user interface.
//!
//! A ratatui dashboard: a login view, a files view with the upload flow,
//! a users view for administrative actions, and a status view.

mod tui;

pub use tui::{DashboardApp, ListingParams, Tab, View};

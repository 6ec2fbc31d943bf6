//! # PanelSelector
//!
//! Tracks which demo panel (RTLS, scheduling, floor mapping or analytics) is active.
//!
//! The panel set is closed: [`PanelKey`] is an enum, so typed callers cannot name an unknown
//! panel, and string input is validated at the [`std::str::FromStr`] boundary.

pub mod error;
pub mod selector;
pub mod types;

pub use error::PanelError;
pub use selector::DemoPanelSelector;
pub use types::{HeadlineMetric, PanelKey};

/// Panel shown before the user picks one
pub const DEFAULT_PANEL: PanelKey = PanelKey::Rtls;

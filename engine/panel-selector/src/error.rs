//! Error types for PanelSelector

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    #[error("Unknown panel '{0}' (expected one of rtls, scheduling, mapping, analytics)")]
    UnknownPanel(String),
}

//! Error types for MetricSimulator

use thiserror::Error;

/// Errors that can occur around the MetricSimulator.
///
/// Ticking, snapshots and stopping never fail. These only cover configuration and the
/// host runtime.
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("No tokio runtime available to schedule ticks")]
    RuntimeUnavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

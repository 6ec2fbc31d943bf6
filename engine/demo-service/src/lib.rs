//! Live Demo Service Library
//!
//! Hosts the live demo engine outside a browser: it loads configuration, sets up logging,
//! runs the metric simulator, feeds panel selections from stdin and shuts everything down
//! cleanly on a signal.

use anyhow::{Context, Result};
use std::path::Path;

pub mod config;
pub mod logging;
pub mod service;
pub mod signals;

pub use config::{ConfigOverrides, ServiceConfig};
pub use logging::initialize_logging;
pub use service::{CommandOutcome, DemoService};
pub use signals::{graceful_shutdown, setup_signal_handlers};

/// Load configuration from defaults, an optional file, environment variables and `overrides`
pub fn load_configuration(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ServiceConfig> {
    config::load_config(path, overrides).context("Failed to load service configuration")
}

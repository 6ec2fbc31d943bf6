//! # MetricSimulator
//!
//! The heartbeat behind the live demo dashboard.
//!
//! The simulator owns three display metrics (active patients, bed occupancy and average
//! wait time) and nudges them on a fixed cadence with independent bounded random walks, so
//! an otherwise static mock dashboard looks like it is fed by a live location system.
//! Nothing here reads real sensors: the numbers only have to stay plausible.

pub mod config;
pub mod error;
pub mod simulator;
pub mod source;
pub mod stats;
pub mod walk;



pub use config::SimulatorConfig;
pub use error::SimulatorError;
pub use stats::SimulatorStats;
pub use simulator::MetricSimulator;
pub use source::UniformSource;
pub use walk::{JitterWalk, MetricSet, StepWalk};

/// Current version of the MetricSimulator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tick cadence (one update every four seconds)
pub const DEFAULT_INTERVAL_MS: u64 = 4000;

/// Active patient count the demo opens with
pub const DEFAULT_ACTIVE_PATIENTS: i64 = 247;

/// Occupied beds the demo opens with
pub const DEFAULT_BED_OCCUPANCY: i64 = 23;

/// Average wait time (minutes) the demo opens with
pub const DEFAULT_WAIT_TIME_MINUTES: f64 = 8.2;

/// Uniform draws consumed by a single tick
pub const DRAWS_PER_TICK: usize = 5;

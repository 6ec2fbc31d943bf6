//! Runtime statistics for MetricSimulator

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::walk::MetricSet;

/// Gauge names published on every tick
pub const ACTIVE_PATIENTS_GAUGE: &str = "live_demo_active_patients";
pub const BED_OCCUPANCY_GAUGE: &str = "live_demo_bed_occupancy";
pub const WAIT_TIME_GAUGE: &str = "live_demo_wait_time_minutes";
pub const TICKS_COUNTER: &str = "live_demo_ticks_total";

/// Point-in-time statistics for a simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorStats {
    /// Ticks applied since construction (scheduled and manual)
    pub ticks_applied: u64,

    /// Number of times the periodic clock was started
    pub starts: u64,

    /// Number of times a running clock was stopped
    pub stops: u64,

    /// Whether the periodic clock is running
    pub is_running: bool,

    /// When the clock was last started
    pub started_at: Option<DateTime<Utc>>,

    /// When the last tick was applied
    pub last_tick_at: Option<DateTime<Utc>>,
}

/// Stats collector for the MetricSimulator
#[derive(Debug, Default)]
pub struct StatsCollector {
    ticks_applied: AtomicU64,
    starts: AtomicU64,
    stops: AtomicU64,
    started_at: Mutex<Option<DateTime<Utc>>>,
    last_tick_at: Mutex<Option<DateTime<Utc>>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied tick and publish the new readings
    pub fn record_tick(&self, metrics: &MetricSet) {
        self.ticks_applied.fetch_add(1, Ordering::Relaxed);
        *self.last_tick_at.lock() = Some(Utc::now());

        metrics::gauge!(ACTIVE_PATIENTS_GAUGE, metrics.active_patients as f64);
        metrics::gauge!(BED_OCCUPANCY_GAUGE, metrics.bed_occupancy as f64);
        metrics::gauge!(WAIT_TIME_GAUGE, metrics.wait_time_minutes);
        metrics::increment_counter!(TICKS_COUNTER);
    }

    pub fn record_start(&self) {
        self.starts.fetch_add(1, Ordering::Relaxed);
        *self.started_at.lock() = Some(Utc::now());
    }

    pub fn record_stop(&self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticks_applied(&self) -> u64 {
        self.ticks_applied.load(Ordering::Relaxed)
    }

    /// Get current stats
    pub fn get_stats(&self, is_running: bool) -> SimulatorStats {
        SimulatorStats {
            ticks_applied: self.ticks_applied.load(Ordering::Relaxed),
            starts: self.starts.load(Ordering::Relaxed),
            stops: self.stops.load(Ordering::Relaxed),
            is_running,
            started_at: *self.started_at.lock(),
            last_tick_at: *self.last_tick_at.lock(),
        }
    }
}

//! Bounded random-walk rules and the metric set they drive

use serde::{Deserialize, Serialize};

use crate::source::UniformSource;
use crate::{DEFAULT_ACTIVE_PATIENTS, DEFAULT_BED_OCCUPANCY, DEFAULT_WAIT_TIME_MINUTES};

/// Integer walk: at most one step up and one step down per tick.
///
/// Two independent draws are taken every tick, even when the first already moved the value,
/// so the draw count per tick is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepWalk {
    /// Add one when the first draw exceeds this
    pub up_above: f64,

    /// Subtract one when the second draw exceeds this
    pub down_above: f64,

    /// Inclusive clamp range; `None` leaves the metric unbounded
    pub bounds: Option<(i64, i64)>,
}

impl StepWalk {
    /// Active patients: +1 with p = 0.3, -1 with p = 0.2, no clamp
    pub const ACTIVE_PATIENTS: StepWalk = StepWalk { up_above: 0.7, down_above: 0.8, bounds: None };

    /// Bed occupancy: +1 with p = 0.4, -1 with p = 0.3, clamped to 15..=30
    pub const BED_OCCUPANCY: StepWalk =
        StepWalk { up_above: 0.6, down_above: 0.7, bounds: Some((15, 30)) };

    /// Apply one step to `value`
    pub fn step(&self, value: i64, source: &mut dyn UniformSource) -> i64 {
        let up = i64::from(source.next_unit() > self.up_above);
        let down = i64::from(source.next_unit() > self.down_above);
        let next = value.saturating_add(up).saturating_sub(down);

        match self.bounds {
            Some((lower, upper)) => next.clamp(lower, upper),
            None => next,
        }
    }

    /// Whether `value` lies inside the clamp range
    pub fn contains(&self, value: i64) -> bool {
        self.bounds.map_or(true, |(lower, upper)| (lower..=upper).contains(&value))
    }
}

/// Continuous walk: a centred perturbation of at most `amplitude / 2` per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterWalk {
    /// Full width of the perturbation; the delta is `(u - 0.5) * amplitude`
    pub amplitude: f64,

    /// Inclusive clamp range
    pub bounds: (f64, f64),
}

impl JitterWalk {
    /// Wait time: +/- 0.25 minutes per tick, clamped to 3..=15
    pub const WAIT_TIME: JitterWalk = JitterWalk { amplitude: 0.5, bounds: (3.0, 15.0) };

    /// Apply one perturbation to `value`
    pub fn step(&self, value: f64, source: &mut dyn UniformSource) -> f64 {
        let delta = (source.next_unit() - 0.5) * self.amplitude;
        let (lower, upper) = self.bounds;
        (value + delta).clamp(lower, upper)
    }

    /// Largest change a single step can make
    pub fn max_step(&self) -> f64 {
        self.amplitude / 2.0
    }

    /// Whether `value` lies inside the clamp range
    pub fn contains(&self, value: f64) -> bool {
        let (lower, upper) = self.bounds;
        (lower..=upper).contains(&value)
    }
}

/// The three dashboard metrics, handed out by value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub active_patients: i64,
    pub bed_occupancy: i64,
    pub wait_time_minutes: f64,
}

impl Default for MetricSet {
    fn default() -> Self {
        Self {
            active_patients: DEFAULT_ACTIVE_PATIENTS,
            bed_occupancy: DEFAULT_BED_OCCUPANCY,
            wait_time_minutes: DEFAULT_WAIT_TIME_MINUTES,
        }
    }
}

impl MetricSet {
    /// Wait time rounded to one decimal, as the dashboard shows it
    pub fn wait_time_rounded(&self) -> f64 {
        (self.wait_time_minutes * 10.0).round() / 10.0
    }
}

/// The walk rules for each metric in a [`MetricSet`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkRules {
    pub active_patients: StepWalk,
    pub bed_occupancy: StepWalk,
    pub wait_time_minutes: JitterWalk,

    /// Optional lower clamp for active patients. Unset by default, which lets the count
    /// drift below zero.
    pub active_patients_floor: Option<i64>,
}

impl Default for WalkRules {
    fn default() -> Self {
        Self {
            active_patients: StepWalk::ACTIVE_PATIENTS,
            bed_occupancy: StepWalk::BED_OCCUPANCY,
            wait_time_minutes: JitterWalk::WAIT_TIME,
            active_patients_floor: None,
        }
    }
}

impl WalkRules {
    /// Advance every metric once.
    ///
    /// Draw order is fixed: patients (2 draws), occupancy (2 draws), wait time (1 draw).
    pub fn advance(&self, metrics: &mut MetricSet, source: &mut dyn UniformSource) {
        let patients = self.active_patients.step(metrics.active_patients, source);
        metrics.active_patients = match self.active_patients_floor {
            Some(floor) => patients.max(floor),
            None => patients,
        };
        metrics.bed_occupancy = self.bed_occupancy.step(metrics.bed_occupancy, source);
        metrics.wait_time_minutes = self.wait_time_minutes.step(metrics.wait_time_minutes, source);
    }
}

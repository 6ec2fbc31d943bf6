//! Configuration for MetricSimulator

use crate::error::SimulatorError;
use crate::walk::{JitterWalk, MetricSet, StepWalk, WalkRules};
use crate::DEFAULT_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the MetricSimulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Tick cadence in milliseconds (default: 4000ms)
    pub interval_ms: u64,

    /// Values the metrics start from
    pub initial: MetricSet,

    /// Random-walk rule per metric
    pub rules: WalkRules,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            initial: MetricSet::default(),
            rules: WalkRules::default(),
        }
    }
}

impl SimulatorConfig {
    /// Get tick cadence as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Capacity the occupancy is displayed against (its upper clamp)
    pub fn bed_capacity(&self) -> Option<i64> {
        self.rules.bed_occupancy.bounds.map(|(_, upper)| upper)
    }

    /// Check that the walk rules are well-formed and the initial values are in range
    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.interval_ms == 0 {
            return Err(SimulatorError::InvalidConfig("interval_ms must be positive".to_string()));
        }

        validate_step("active_patients", &self.rules.active_patients)?;
        validate_step("bed_occupancy", &self.rules.bed_occupancy)?;
        validate_jitter("wait_time_minutes", &self.rules.wait_time_minutes)?;

        if !self.rules.active_patients.contains(self.initial.active_patients) {
            return Err(SimulatorError::InvalidConfig(format!(
                "initial active_patients {} is outside its bounds",
                self.initial.active_patients
            )));
        }
        if let Some(floor) = self.rules.active_patients_floor {
            if self.initial.active_patients < floor {
                return Err(SimulatorError::InvalidConfig(format!(
                    "initial active_patients {} is below the floor {}",
                    self.initial.active_patients, floor
                )));
            }
        }
        if !self.rules.bed_occupancy.contains(self.initial.bed_occupancy) {
            return Err(SimulatorError::InvalidConfig(format!(
                "initial bed_occupancy {} is outside its bounds",
                self.initial.bed_occupancy
            )));
        }
        if !self.rules.wait_time_minutes.contains(self.initial.wait_time_minutes) {
            return Err(SimulatorError::InvalidConfig(format!(
                "initial wait_time_minutes {} is outside its bounds",
                self.initial.wait_time_minutes
            )));
        }

        Ok(())
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimulatorError> {
        let content = std::fs::read_to_string(path)?;
        let config: SimulatorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), SimulatorError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn validate_step(name: &str, walk: &StepWalk) -> Result<(), SimulatorError> {
    for threshold in [walk.up_above, walk.down_above] {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SimulatorError::InvalidConfig(format!(
                "{name}: threshold {threshold} is outside [0, 1]"
            )));
        }
    }
    if let Some((lower, upper)) = walk.bounds {
        if lower > upper {
            return Err(SimulatorError::InvalidConfig(format!(
                "{name}: lower bound {lower} exceeds upper bound {upper}"
            )));
        }
    }
    Ok(())
}

fn validate_jitter(name: &str, walk: &JitterWalk) -> Result<(), SimulatorError> {
    if !walk.amplitude.is_finite() || walk.amplitude < 0.0 {
        return Err(SimulatorError::InvalidConfig(format!(
            "{name}: amplitude {} must be finite and non-negative",
            walk.amplitude
        )));
    }
    let (lower, upper) = walk.bounds;
    if !(lower.is_finite() && upper.is_finite()) || lower > upper {
        return Err(SimulatorError::InvalidConfig(format!(
            "{name}: bounds ({lower}, {upper}) are not a valid range"
        )));
    }
    Ok(())
}

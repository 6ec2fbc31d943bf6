//! Panel identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PanelError;

/// One of the four demo panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKey {
    /// Real-time location tracking
    Rtls,
    /// AI-optimized appointment schedule
    Scheduling,
    /// Per-floor occupancy map
    Mapping,
    /// Operational analytics
    Analytics,
}

/// A live metric a panel puts in its header cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadlineMetric {
    ActivePatients,
    BedOccupancy,
    WaitTimeMinutes,
}

impl PanelKey {
    /// Every panel, in tab order
    pub const ALL: [PanelKey; 4] =
        [PanelKey::Rtls, PanelKey::Scheduling, PanelKey::Mapping, PanelKey::Analytics];

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKey::Rtls => "rtls",
            PanelKey::Scheduling => "scheduling",
            PanelKey::Mapping => "mapping",
            PanelKey::Analytics => "analytics",
        }
    }

    /// Translation key for the tab title
    pub fn title_key(&self) -> String {
        format!("demo.{}.title", self.as_str())
    }

    /// Translation key for the tab subtitle
    pub fn subtitle_key(&self) -> String {
        format!("demo.{}.subtitle", self.as_str())
    }

    /// Live metrics the panel shows; mapping and analytics only show static tables
    pub fn headline_metrics(&self) -> &'static [HeadlineMetric] {
        match self {
            PanelKey::Rtls => &[HeadlineMetric::ActivePatients, HeadlineMetric::BedOccupancy],
            PanelKey::Scheduling => &[HeadlineMetric::WaitTimeMinutes],
            PanelKey::Mapping | PanelKey::Analytics => &[],
        }
    }
}

impl fmt::Display for PanelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKey {
    type Err = PanelError;

    /// Keys are matched exactly; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PanelKey::ALL
            .into_iter()
            .find(|key| key.as_str() == trimmed)
            .ok_or_else(|| PanelError::UnknownPanel(trimmed.to_string()))
    }
}

//! Detection event types and category → group classification

use serde::{Deserialize, Serialize};

/// Category set the simulator draws from when none is configured.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["pedestrian", "bicycle", "car", "truck", "van"];

const PEOPLE_CATEGORIES: [&str; 2] = ["pedestrian", "bicycle"];

/// Coarse classification used for session partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DetectionGroup {
    #[serde(rename = "people")]
    People,
    #[serde(rename = "vehicles")]
    Vehicles,
}

impl DetectionGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionGroup::People => "people",
            DetectionGroup::Vehicles => "vehicles",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "people" => Some(DetectionGroup::People),
            "vehicles" => Some(DetectionGroup::Vehicles),
            _ => None,
        }
    }
}

/// Classify a category into its group.
///
/// Total function: anything not recognized as people traffic counts as
/// a vehicle. The group is always derived from the category at the
/// moment it is needed, never stored as independent truth.
pub fn group_for_category(category: &str) -> DetectionGroup {
    if PEOPLE_CATEGORIES.contains(&category) {
        DetectionGroup::People
    } else {
        DetectionGroup::Vehicles
    }
}

/// One timestamped observation of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub category: String,
    pub group: DetectionGroup,
    /// Unix seconds the sensor observed the category.
    pub detected_at: i64,
    /// Unix seconds the event entered this process.
    pub recorded_at: i64,
}

impl Detection {
    pub fn new(category: impl Into<String>, detected_at: i64, recorded_at: i64) -> Self {
        let category = category.into();
        let group = group_for_category(&category);
        Self {
            category,
            group,
            detected_at,
            recorded_at,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;

/// Canonical column order of the training CSV.
///
/// Every writer and the trainer use this single layout. Field order of
/// `SensorRecord` MUST match it.
pub const CANONICAL_HEADER: &[&str] = &[
    "pole_id",
    "area_name",
    "location",
    "current",
    "voltage",
    "power",
    "detection",
    "timestamp",
];

/// One row of the training data store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SensorRecord {
    // Optional metadata
    pub pole_id: Option<String>,
    pub area_name: Option<String>,
    pub location: Option<String>,

    // Features
    pub current: f64,
    pub voltage: f64,
    pub power: f64,

    // Supplied label (0 = normal, 1 = theft); empty when unlabeled
    pub detection: Option<u8>,

    pub timestamp: Option<DateTime<Utc>>,
}

impl SensorRecord {
    /// Bare reading without metadata, label or timestamp
    pub fn reading(current: f64, voltage: f64, power: f64) -> Self {
        Self {
            pole_id: None,
            area_name: None,
            location: None,
            current,
            voltage,
            power,
            detection: None,
            timestamp: None,
        }
    }

    pub fn with_detection(mut self, detection: u8) -> Self {
        self.detection = Some(detection);
        self
    }

    pub fn with_pole(mut self, pole_id: impl Into<String>, location: impl Into<String>) -> Self {
        self.pole_id = Some(pole_id.into());
        self.location = Some(location.into());
        self
    }

    pub fn with_area(mut self, area_name: impl Into<String>) -> Self {
        self.area_name = Some(area_name.into());
        self
    }

    pub fn stamped_now(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(self.current, self.voltage, self.power)
    }
}

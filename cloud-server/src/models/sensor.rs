//! Sensor request and response models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use gridguard_core::{FeatureVector, SensorRecord};

use super::coerce;

/// Body of `/api/analyse`.
///
/// The three features are required; every other field is carried through
/// to the result untouched.
#[derive(Debug, Deserialize)]
pub struct AnalyseRequest {
    #[serde(deserialize_with = "coerce::number")]
    pub current: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub voltage: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub power: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalyseRequest {
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(self.current, self.voltage, self.power)
    }

    pub fn into_result(mut self, detection: u8) -> AnalysisResult {
        // A client-sent label is replaced, not duplicated
        self.extra.remove("detection");
        AnalysisResult {
            extra: self.extra,
            current: self.current,
            voltage: self.voltage,
            power: self.power,
            detection,
        }
    }
}

/// Echoed request plus the predicted label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub current: f64,
    pub voltage: f64,
    pub power: f64,
    pub detection: u8,
}

/// Reading from a street pole, used by `/detect-theft/` and `/collect-data/`
#[derive(Debug, Deserialize, Validate)]
pub struct SensorData {
    pub pole_id: String,
    #[serde(default)]
    pub area_name: Option<String>,
    pub location: String,

    #[serde(deserialize_with = "coerce::number")]
    pub current: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub voltage: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub power: f64,

    #[serde(default, deserialize_with = "coerce::opt_label")]
    #[validate(range(min = 0, max = 1))]
    pub detection: Option<u8>,
}

impl SensorData {
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(self.current, self.voltage, self.power)
    }

    /// Row for the training store, stamped with the current time
    pub fn to_record(&self) -> SensorRecord {
        let mut record = SensorRecord::reading(self.current, self.voltage, self.power)
            .with_pole(&self.pole_id, &self.location)
            .stamped_now();
        if let Some(area) = &self.area_name {
            record = record.with_area(area);
        }
        if let Some(detection) = self.detection {
            record = record.with_detection(detection);
        }
        record
    }
}

/// Labeled reading for `/api/store-data`
#[derive(Debug, Deserialize, Validate)]
pub struct StoreDataRequest {
    #[serde(deserialize_with = "coerce::number")]
    pub current: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub voltage: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub power: f64,

    #[serde(deserialize_with = "coerce::label")]
    #[validate(range(min = 0, max = 1))]
    pub detection: u8,
}

impl StoreDataRequest {
    pub fn to_record(&self) -> SensorRecord {
        SensorRecord::reading(self.current, self.voltage, self.power).with_detection(self.detection)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub status: String,
    pub message: String,
    pub pole_id: String,
    pub location: String,
}

impl DetectionResponse {
    pub fn alert(data: &SensorData) -> Self {
        Self::build("alert", "Electricity theft detected!", data)
    }

    pub fn ok(data: &SensorData) -> Self {
        Self::build("ok", "No theft detected.", data)
    }

    fn build(status: &str, message: &str, data: &SensorData) -> Self {
        Self {
            status: status.to_string(),
            message: message.to_string(),
            pole_id: data.pole_id.clone(),
            location: data.location.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CollectResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreDataResponse {
    pub status: String,
}

//! Label Derivation - power threshold rule
//!
//! The threshold is a placeholder heuristic, not a learned boundary.
//! `LabelPolicy` decides whether training labels come from the supplied
//! `detection` column, from the threshold, or from the column with the
//! threshold as fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_POWER_THRESHOLD;
use crate::logic::dataset::SensorRecord;

/// Normal consumption
pub const LABEL_NORMAL: u8 = 0;
/// Suspected theft
pub const LABEL_THEFT: u8 = 1;

/// Power Threshold Rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerThreshold {
    /// Readings at or below this value are normal
    pub max_normal_power: f64,
}

impl Default for PowerThreshold {
    fn default() -> Self {
        Self {
            max_normal_power: DEFAULT_POWER_THRESHOLD,
        }
    }
}

impl PowerThreshold {
    pub fn new(max_normal_power: f64) -> Self {
        Self { max_normal_power }
    }

    /// label = 0 if power <= threshold else 1
    pub fn label(&self, power: f64) -> u8 {
        if power <= self.max_normal_power {
            LABEL_NORMAL
        } else {
            LABEL_THEFT
        }
    }
}

/// Where training labels come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPolicy {
    /// Only the supplied `detection` column; unlabeled rows are an error
    Supplied,
    /// Always derive from power, ignoring `detection`
    Threshold,
    /// Supplied label when present, otherwise derived
    #[default]
    PreferSupplied,
}

impl LabelPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelPolicy::Supplied => "supplied",
            LabelPolicy::Threshold => "threshold",
            LabelPolicy::PreferSupplied => "prefer-supplied",
        }
    }
}

impl fmt::Display for LabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supplied" => Ok(LabelPolicy::Supplied),
            "threshold" => Ok(LabelPolicy::Threshold),
            "prefer-supplied" | "prefer_supplied" => Ok(LabelPolicy::PreferSupplied),
            other => Err(format!("unknown label policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LabelError {
    #[error("row {row} has no detection value (label policy: supplied)")]
    Missing { row: usize },

    #[error("row {row} has detection {value}, expected 0 or 1")]
    OutOfRange { row: usize, value: u8 },
}

/// Labeler - applies a policy and threshold to store rows
#[derive(Debug, Clone, Copy, Default)]
pub struct Labeler {
    pub policy: LabelPolicy,
    pub threshold: PowerThreshold,
}

impl Labeler {
    pub fn new(policy: LabelPolicy, threshold: PowerThreshold) -> Self {
        Self { policy, threshold }
    }

    /// Label for one row (`row` is 1-based, used for error reporting)
    pub fn label(&self, row: usize, record: &SensorRecord) -> Result<u8, LabelError> {
        match (self.policy, record.detection) {
            (LabelPolicy::Threshold, _) => Ok(self.threshold.label(record.power)),
            (_, Some(value)) if value > LABEL_THEFT => Err(LabelError::OutOfRange { row, value }),
            (_, Some(value)) => Ok(value),
            (LabelPolicy::Supplied, None) => Err(LabelError::Missing { row }),
            (LabelPolicy::PreferSupplied, None) => Ok(self.threshold.label(record.power)),
        }
    }

    pub fn label_all(&self, records: &[SensorRecord]) -> Result<Vec<u8>, LabelError> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| self.label(i + 1, r))
            .collect()
    }
}

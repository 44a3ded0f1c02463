//! Feature Vector - single-row model input
//!
//! Values are ordered as defined in `layout.rs`.

use serde::{Deserialize, Serialize};
use super::layout::{Feature, FEATURE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new(current: f64, voltage: f64, power: f64) -> Self {
        Self { values: [current, voltage, power] }
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    pub fn power(&self) -> f64 {
        self.values[Feature::Power.index()]
    }

    /// All values are finite (no NaN / inf)
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_order() {
        let v = FeatureVector::new(2.0, 230.0, 5.5);
        assert_eq!(v.as_array(), &[2.0, 230.0, 5.5]);
        assert_eq!(v.power(), 5.5);
    }

    #[test]
    fn test_non_finite_detected() {
        assert!(FeatureVector::new(1.0, 2.0, 3.0).is_finite());
        assert!(!FeatureVector::new(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!FeatureVector::new(1.0, f64::INFINITY, 3.0).is_finite());
    }
}

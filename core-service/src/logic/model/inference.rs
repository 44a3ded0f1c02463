//! Inference Engine - loaded forest artifact
//!
//! A `Predictor` is built once from a validated artifact and is immutable
//! afterwards, so it can be shared across request handlers behind an `Arc`.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;
use super::artifact::{load_artifact, ArtifactError, ModelArtifact};
use super::tree::Classifier;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("failed to load model: {0}")]
    Load(#[from] ArtifactError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 0 = normal, 1 = theft
    pub label: u8,
    /// Mean theft probability across trees
    pub theft_probability: f64,
    pub inference_time_us: u64,
}

impl Prediction {
    pub fn is_theft(&self) -> bool {
        self.label == 1
    }
}

/// Model metadata exposed to callers (health probes, logs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub trees: usize,
    pub trained_at: i64,
    pub training_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Predictor {
    artifact: ModelArtifact,
}

impl Predictor {
    /// Load and validate an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        log::info!("Loading model artifact from: {}", path.display());

        let artifact = load_artifact(path)?;

        log::info!(
            "Model loaded: {} trees, trained on {} rows",
            artifact.forest.n_trees(),
            artifact.training_rows
        );
        Ok(Self { artifact })
    }

    /// Wrap an in-memory artifact (validated first)
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, InferenceError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, InferenceError> {
        if !features.is_finite() {
            return Err(InferenceError::InvalidInput(format!(
                "features must be finite numbers, got {:?}",
                features.as_array()
            )));
        }

        let start = Instant::now();
        let proba = self.artifact.forest.predict_proba(features);
        let label = if proba[1] > proba[0] { 1 } else { 0 };

        Ok(Prediction {
            label,
            theft_probability: proba[1],
            inference_time_us: start.elapsed().as_micros() as u64,
        })
    }

    pub fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            format_version: self.artifact.format_version,
            feature_names: self.artifact.feature_names.clone(),
            trees: self.artifact.forest.n_trees(),
            trained_at: self.artifact.trained_at,
            training_rows: self.artifact.training_rows,
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::forest::{ForestConfig, RandomForest};
    use crate::logic::model::threshold::LabelPolicy;

    fn predictor() -> Predictor {
        let x: Vec<FeatureVector> = (0..30)
            .map(|i| FeatureVector::new(2.0, 230.0, i as f64 * 0.5))
            .collect();
        let y: Vec<u8> = x.iter().map(|v| (v.power() > 6.0) as u8).collect();
        let forest = RandomForest::fit(ForestConfig { n_estimators: 10, ..Default::default() }, &x, &y).unwrap();
        Predictor::from_artifact(ModelArtifact::new(forest, 30, LabelPolicy::Threshold).unwrap()).unwrap()
    }

    #[test]
    fn test_predict_binary_label() {
        let p = predictor();
        let normal = p.predict(&FeatureVector::new(2.0, 230.0, 3.0)).unwrap();
        let theft = p.predict(&FeatureVector::new(2.0, 230.0, 12.0)).unwrap();

        assert_eq!(normal.label, 0);
        assert!(theft.is_theft());
        assert!((0.0..=1.0).contains(&theft.theft_probability));
    }

    #[test]
    fn test_reject_non_finite() {
        let p = predictor();
        let result = p.predict(&FeatureVector::new(f64::NAN, 230.0, 3.0));
        assert!(matches!(result, Err(InferenceError::InvalidInput(_))));
    }

    #[test]
    fn test_metadata() {
        let meta = predictor().metadata();
        assert_eq!(meta.trees, 10);
        assert_eq!(meta.training_rows, 30);
    }
}

//! Trainer - batch train / evaluate / persist
//!
//! Loads the whole data store, labels it, splits, fits the forest, evaluates
//! on the held-out rows and (optionally) persists the artifact. Any failure
//! aborts the run; there is no partial success.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_N_ESTIMATORS, DEFAULT_SEED, DEFAULT_TEST_SIZE};
use crate::logic::dataset::{CsvStore, StoreError};
use crate::logic::features::FeatureVector;
use super::artifact::{save_artifact, ArtifactError, ModelArtifact};
use super::forest::{ClassWeight, ForestConfig, ForestError, RandomForest};
use super::metrics::ClassificationReport;
use super::split::{train_test_split, SplitError};
use super::threshold::{LabelError, LabelPolicy, Labeler, PowerThreshold};
use super::tree::Classifier;

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("data store error: {0}")]
    Store(#[from] StoreError),

    #[error("data store {0} has no rows")]
    EmptyDataset(String),

    #[error("labeling failed: {0}")]
    Label(#[from] LabelError),

    #[error("split failed: {0}")]
    Split(#[from] SplitError),

    #[error("fit failed: {0}")]
    Fit(#[from] ForestError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Training Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub n_estimators: usize,
    /// Held-out fraction, in (0, 1)
    pub test_size: f64,
    pub stratify: bool,
    pub seed: u64,
    pub class_weight: ClassWeight,
    pub label_policy: LabelPolicy,
    pub power_threshold: PowerThreshold,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            test_size: DEFAULT_TEST_SIZE,
            stratify: true,
            seed: DEFAULT_SEED,
            class_weight: ClassWeight::Balanced,
            label_policy: LabelPolicy::default(),
            power_threshold: PowerThreshold::default(),
        }
    }
}

impl TrainingConfig {
    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_estimators: self.n_estimators,
            class_weight: self.class_weight,
            seed: self.seed,
            ..Default::default()
        }
    }

    pub fn labeler(&self) -> Labeler {
        Labeler::new(self.label_policy, self.power_threshold)
    }
}

/// Result of one training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub report: ClassificationReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on every row of the store
    pub fn train(&self, store: &CsvStore) -> Result<TrainingOutcome, TrainingError> {
        let records = store.load_all()?;
        if records.is_empty() {
            return Err(TrainingError::EmptyDataset(store.path().display().to_string()));
        }

        let labels = self.config.labeler().label_all(&records)?;
        let features: Vec<FeatureVector> = records.iter().map(|r| r.features()).collect();

        let theft = labels.iter().filter(|&&l| l == 1).count();
        log::info!(
            "Loaded {} rows ({} normal, {} theft) using label policy '{}'",
            records.len(),
            records.len() - theft,
            theft,
            self.config.label_policy
        );

        let split = train_test_split(&labels, self.config.test_size, self.config.stratify, self.config.seed)?;

        let x_train: Vec<FeatureVector> = split.train.iter().map(|&i| features[i]).collect();
        let y_train: Vec<u8> = split.train.iter().map(|&i| labels[i]).collect();

        let forest = RandomForest::fit(self.config.forest_config(), &x_train, &y_train)?;

        let y_test: Vec<u8> = split.test.iter().map(|&i| labels[i]).collect();
        let y_pred: Vec<u8> = split.test.iter().map(|&i| forest.predict(&features[i])).collect();
        let report = ClassificationReport::from_predictions(&y_test, &y_pred);

        if split.test.is_empty() {
            log::warn!("Test partition is empty; metrics are not meaningful");
        } else {
            log::info!(
                "Evaluated on {} held-out rows: accuracy {:.3}",
                split.test.len(),
                report.accuracy
            );
        }

        let artifact = ModelArtifact::new(forest, split.train.len(), self.config.label_policy)?;

        Ok(TrainingOutcome {
            artifact,
            report,
            train_rows: split.train.len(),
            test_rows: split.test.len(),
        })
    }

    /// Train, then write the artifact (replacing any previous model)
    pub fn train_and_persist(&self, store: &CsvStore, model_path: &Path) -> Result<TrainingOutcome, TrainingError> {
        let outcome = self.train(store)?;
        save_artifact(&outcome.artifact, model_path)?;
        Ok(outcome)
    }
}

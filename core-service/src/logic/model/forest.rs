//! Random Forest - bagged CART ensemble
//!
//! Bootstrap resampling, random feature subsets per split and optional
//! `balanced` class weighting (`n / (n_classes * count_c)`) to counteract
//! class imbalance. Seeded, so identical inputs grow identical forests.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_N_ESTIMATORS, DEFAULT_SEED};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use super::tree::{grow_tree, Classifier, DecisionTree, TreeConfig, N_CLASSES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Every sample counts once
    None,
    /// Minority-class errors weighted up
    #[default]
    Balanced,
}

impl fmt::Display for ClassWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassWeight::None => f.write_str("none"),
            ClassWeight::Balanced => f.write_str("balanced"),
        }
    }
}

impl FromStr for ClassWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ClassWeight::None),
            "balanced" => Ok(ClassWeight::Balanced),
            other => Err(format!("unknown class weight: {}", other)),
        }
    }
}

/// Forest hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    /// `None` → max(1, floor(sqrt(n_features)))
    pub max_features: Option<usize>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub bootstrap: bool,
    pub class_weight: ClassWeight,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_features: None,
            max_depth: None,
            min_samples_split: 2,
            bootstrap: true,
            class_weight: ClassWeight::Balanced,
            seed: DEFAULT_SEED,
        }
    }
}

impl ForestConfig {
    pub fn tree_config(&self) -> TreeConfig {
        let sqrt_features = ((FEATURE_COUNT as f64).sqrt().floor() as usize).max(1);
        TreeConfig {
            max_features: self.max_features.unwrap_or(sqrt_features).clamp(1, FEATURE_COUNT),
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split.max(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestError {
    #[error("no training samples")]
    EmptyTrainingSet,

    #[error("feature rows ({features}) and labels ({labels}) differ in length")]
    LengthMismatch { features: usize, labels: usize },

    #[error("label {0} is not a valid class")]
    InvalidLabel(u8),

    #[error("n_estimators must be at least 1")]
    NoEstimators,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub config: ForestConfig,
    /// Per-class weights applied during fitting
    pub class_weights: [f64; N_CLASSES],
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(config: ForestConfig, x: &[FeatureVector], y: &[u8]) -> Result<Self, ForestError> {
        if x.len() != y.len() {
            return Err(ForestError::LengthMismatch { features: x.len(), labels: y.len() });
        }
        if x.is_empty() {
            return Err(ForestError::EmptyTrainingSet);
        }
        if config.n_estimators == 0 {
            return Err(ForestError::NoEstimators);
        }
        if let Some(&bad) = y.iter().find(|&&l| l as usize >= N_CLASSES) {
            return Err(ForestError::InvalidLabel(bad));
        }

        let class_weights = compute_class_weights(config.class_weight, y);
        let tree_config = config.tree_config();
        let mut master = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_estimators)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.gen());
                let weights = sample_weights(&config, &class_weights, y, &mut rng);
                grow_tree(&tree_config, x, y, &weights, &mut rng)
            })
            .collect();

        log::debug!(
            "Fitted forest: {} trees, class weights {:?}",
            config.n_estimators,
            class_weights
        );

        Ok(Self { config, class_weights, trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Structural check for forests read from disk
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    /// Mean of the per-tree class probabilities
    fn predict_proba(&self, x: &FeatureVector) -> [f64; N_CLASSES] {
        let mut sum = [0.0; N_CLASSES];
        for tree in &self.trees {
            let proba = tree.predict_proba(x);
            sum[0] += proba[0];
            sum[1] += proba[1];
        }
        let n = self.trees.len().max(1) as f64;
        [sum[0] / n, sum[1] / n]
    }
}

fn compute_class_weights(mode: ClassWeight, y: &[u8]) -> [f64; N_CLASSES] {
    match mode {
        ClassWeight::None => [1.0; N_CLASSES],
        ClassWeight::Balanced => {
            let mut counts = [0usize; N_CLASSES];
            for &label in y {
                counts[label as usize] += 1;
            }
            let n = y.len() as f64;
            let mut weights = [1.0; N_CLASSES];
            for (w, &count) in weights.iter_mut().zip(counts.iter()) {
                if count > 0 {
                    *w = n / (N_CLASSES as f64 * count as f64);
                }
            }
            weights
        }
    }
}

/// Bootstrap multiplicity times class weight, per sample
fn sample_weights<R: Rng + ?Sized>(
    config: &ForestConfig,
    class_weights: &[f64; N_CLASSES],
    y: &[u8],
    rng: &mut R,
) -> Vec<f64> {
    let n = y.len();
    let mut counts = vec![0.0; n];

    if config.bootstrap {
        for _ in 0..n {
            counts[rng.gen_range(0..n)] += 1.0;
        }
    } else {
        counts.iter_mut().for_each(|c| *c = 1.0);
    }

    counts
        .iter()
        .zip(y)
        .map(|(count, &label)| count * class_weights[label as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Separable on current and power; voltage constant
    fn synthetic(normal: usize, theft: usize) -> (Vec<FeatureVector>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..normal {
            let t = i as f64 / normal.max(1) as f64;
            x.push(FeatureVector::new(1.5 + t, 230.0, 3.0 + 2.8 * t));
            y.push(0);
        }
        for i in 0..theft {
            let t = i as f64 / theft.max(1) as f64;
            x.push(FeatureVector::new(4.0 + 2.0 * t, 230.0, 8.0 + 6.0 * t));
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_balanced_weights() {
        let y = vec![0, 0, 0, 1];
        let w = compute_class_weights(ClassWeight::Balanced, &y);
        assert!((w[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((w[1] - 2.0).abs() < 1e-12);

        assert_eq!(compute_class_weights(ClassWeight::None, &y), [1.0, 1.0]);
    }

    #[test]
    fn test_single_class_weight_untouched() {
        let w = compute_class_weights(ClassWeight::Balanced, &[1, 1, 1]);
        assert_eq!(w[0], 1.0);
        assert!((w[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_default_tree_config() {
        let tc = ForestConfig::default().tree_config();
        assert_eq!(tc.max_features, 1);
        assert_eq!(tc.max_depth, None);
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = synthetic(60, 20);
        let forest = RandomForest::fit(ForestConfig::default(), &x, &y).unwrap();

        assert_eq!(forest.n_trees(), DEFAULT_N_ESTIMATORS);
        assert!(forest.validate().is_ok());

        assert_eq!(forest.predict(&FeatureVector::new(2.0, 230.0, 5.5)), 0);
        assert_eq!(forest.predict(&FeatureVector::new(5.0, 230.0, 11.0)), 1);

        let proba = forest.predict_proba(&FeatureVector::new(2.0, 230.0, 5.5));
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = synthetic(30, 10);
        let config = ForestConfig { n_estimators: 10, ..Default::default() };

        let a = RandomForest::fit(config, &x, &y).unwrap();
        let b = RandomForest::fit(config, &x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let (x, y) = synthetic(3, 3);
        let config = ForestConfig::default();

        assert_eq!(RandomForest::fit(config, &[], &[]), Err(ForestError::EmptyTrainingSet));
        assert_eq!(
            RandomForest::fit(config, &x, &y[..2]),
            Err(ForestError::LengthMismatch { features: 6, labels: 2 })
        );
        assert_eq!(
            RandomForest::fit(ForestConfig { n_estimators: 0, ..config }, &x, &y),
            Err(ForestError::NoEstimators)
        );

        let mut bad = y.clone();
        bad[0] = 4;
        assert_eq!(RandomForest::fit(config, &x, &bad), Err(ForestError::InvalidLabel(4)));
    }

    #[test]
    fn test_labels_always_binary() {
        let (x, y) = synthetic(25, 25);
        let forest = RandomForest::fit(ForestConfig { n_estimators: 15, ..Default::default() }, &x, &y).unwrap();

        for i in 0..50 {
            let v = FeatureVector::new(i as f64 * 0.2, 200.0 + i as f64, i as f64 * 0.4);
            assert!(forest.predict(&v) <= 1);
        }
    }
}

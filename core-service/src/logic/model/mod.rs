//! Model Module - theft classifier
//!
//! Training (forest, split, metrics, trainer), the versioned artifact and
//! the inference side (predictor). Labeling rules live in `threshold`.

pub mod artifact;
pub mod forest;
pub mod inference;
pub mod metrics;
pub mod split;
pub mod threshold;
pub mod trainer;
pub mod tree;

#[cfg(test)]
mod tests;

// Re-export common types
pub use artifact::{load_artifact, save_artifact, ArtifactError, ModelArtifact};
pub use forest::{ClassWeight, ForestConfig, RandomForest};
pub use inference::{InferenceError, ModelMetadata, Prediction, Predictor};
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use threshold::{LabelPolicy, Labeler, PowerThreshold};
pub use trainer::{Trainer, TrainingConfig, TrainingError, TrainingOutcome};
pub use tree::{Classifier, DecisionTree};

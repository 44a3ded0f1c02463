//! Model Artifact - versioned on-disk format
//!
//! Plain tagged data: format name and version, the feature layout the model
//! was trained against, a SHA-256 checksum of the serialised forest, and the
//! forest itself. Loading validates every one of these before the model is
//! handed to a predictor.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::features::layout::{
    feature_names, layout_hash, validate_layout, LayoutMismatchError, FEATURE_VERSION,
};
use super::forest::RandomForest;
use super::threshold::LabelPolicy;

/// Format tag written into every artifact
pub const ARTIFACT_FORMAT: &str = "gridguard-forest";

/// Current artifact format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown artifact format `{0}`")]
    UnknownFormat(String),

    #[error("unsupported artifact format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },

    #[error("invalid model structure: {0}")]
    InvalidStructure(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub format_version: u32,

    // Feature contract
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_names: Vec<String>,

    // Training provenance
    pub trained_at: i64,
    pub training_rows: usize,
    pub label_policy: LabelPolicy,

    /// Hex SHA-256 of the serialised `forest`
    pub checksum: String,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(forest: RandomForest, training_rows: usize, label_policy: LabelPolicy) -> Result<Self, ArtifactError> {
        let checksum = forest_checksum(&forest)?;
        Ok(Self {
            format: ARTIFACT_FORMAT.to_string(),
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_names: feature_names(),
            trained_at: chrono::Utc::now().timestamp(),
            training_rows,
            label_policy,
            checksum,
            forest,
        })
    }

    /// Validate tag, version, layout, checksum and tree structure
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.format != ARTIFACT_FORMAT {
            return Err(ArtifactError::UnknownFormat(self.format.clone()));
        }
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                supported: ARTIFACT_FORMAT_VERSION,
            });
        }

        validate_layout(self.feature_version, self.layout_hash, &self.feature_names)?;

        let computed = forest_checksum(&self.forest)?;
        if computed != self.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: self.checksum.clone(),
                computed,
            });
        }

        self.forest.validate().map_err(ArtifactError::InvalidStructure)
    }
}

fn forest_checksum(forest: &RandomForest) -> Result<String, ArtifactError> {
    let bytes = serde_json::to_vec(forest)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Save artifact to disk
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Readers never see a half-written model
    let json = serde_json::to_vec(artifact)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    log::info!("Model artifact written to {}", path.display());
    Ok(())
}

/// Load artifact from disk with validation
pub fn load_artifact(path: &Path) -> Result<ModelArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("model artifact not found: {}", path.display()),
        )));
    }

    let data = fs::read(path)?;
    let artifact: ModelArtifact = serde_json::from_slice(&data)?;

    artifact.validate()?;

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureVector;
    use crate::logic::model::forest::ForestConfig;
    use crate::logic::model::tree::Node;

    fn small_artifact() -> ModelArtifact {
        let x: Vec<FeatureVector> = (0..20)
            .map(|i| FeatureVector::new(1.0 + i as f64 * 0.1, 230.0, i as f64))
            .collect();
        let y: Vec<u8> = (0..20).map(|i| (i > 6) as u8).collect();
        let forest = RandomForest::fit(ForestConfig { n_estimators: 5, ..Default::default() }, &x, &y).unwrap();
        ModelArtifact::new(forest, 20, LabelPolicy::Threshold).unwrap()
    }

    #[test]
    fn test_new_artifact_is_valid() {
        let artifact = small_artifact();
        assert_eq!(artifact.format, ARTIFACT_FORMAT);
        assert_eq!(artifact.feature_names, vec!["current", "voltage", "power"]);
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("model.json");

        let original = small_artifact();
        save_artifact(&original, &path).unwrap();
        let loaded = load_artifact(&path).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_reject_unknown_format() {
        let mut artifact = small_artifact();
        artifact.format = "joblib".to_string();
        assert!(matches!(artifact.validate(), Err(ArtifactError::UnknownFormat(_))));
    }

    #[test]
    fn test_reject_future_version() {
        let mut artifact = small_artifact();
        artifact.format_version = ARTIFACT_FORMAT_VERSION + 1;
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_reject_layout_mismatch() {
        let mut artifact = small_artifact();
        artifact.layout_hash = !artifact.layout_hash;
        assert!(matches!(artifact.validate(), Err(ArtifactError::LayoutMismatch(_))));
    }

    #[test]
    fn test_reject_tampered_forest() {
        let mut artifact = small_artifact();
        artifact.forest.trees[0].nodes[0] = Node::Leaf { proba: [0.25, 0.75] };
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_reject_invalid_structure_with_matching_checksum() {
        let mut artifact = small_artifact();
        artifact.forest.trees.clear();
        artifact.checksum = forest_checksum(&artifact.forest).unwrap();
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_load_missing_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_artifact(&missing), Err(ArtifactError::Io(_))));

        let garbage = dir.path().join("model.pkl");
        fs::write(&garbage, b"\x80\x04\x95not json").unwrap();
        assert!(matches!(load_artifact(&garbage), Err(ArtifactError::Serialization(_))));
    }
}

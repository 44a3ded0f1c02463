//! Feature Layout
//!
//! Ordered inputs of the theft classifier. The trainer, the persisted
//! artifact and the predictor all index feature vectors through this table.
//!
//! Adding, removing or reordering a feature bumps `FEATURE_VERSION`. An
//! artifact stamped with another version, hash or name list is refused.

use std::fmt;

use crc32fast::Hasher;

pub const FEATURE_VERSION: u8 = 1;

/// One classifier input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Line current (A)
    Current,
    /// Line voltage (V)
    Voltage,
    /// Active power reading
    Power,
}

impl Feature {
    /// Vector order
    pub const ALL: [Feature; 3] = [Feature::Current, Feature::Voltage, Feature::Power];

    pub const fn index(self) -> usize {
        match self {
            Feature::Current => 0,
            Feature::Voltage => 1,
            Feature::Power => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Feature::Current => "current",
            Feature::Voltage => "voltage",
            Feature::Power => "power",
        }
    }

    pub fn from_index(index: usize) -> Option<Feature> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const FEATURE_COUNT: usize = Feature::ALL.len();

/// Column names in vector order
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    Feature::Current.name(),
    Feature::Voltage.name(),
    Feature::Power.name(),
];

/// CRC32 over the version byte and the NUL-separated names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Layout stamped into an artifact does not match this build
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutMismatchError {
    #[error(
        "feature layout v{found} (hash {found_hash:08x}), this build expects v{} (hash {expected_hash:08x})",
        FEATURE_VERSION
    )]
    Version {
        found: u8,
        found_hash: u32,
        expected_hash: u32,
    },

    #[error("feature names {found:?}, expected {:?}", FEATURE_LAYOUT)]
    Names { found: Vec<String> },
}

/// Check a stored layout stamp against the current layout
pub fn validate_layout(version: u8, hash: u32, names: &[String]) -> Result<(), LayoutMismatchError> {
    let expected_hash = layout_hash();
    if version != FEATURE_VERSION || hash != expected_hash {
        return Err(LayoutMismatchError::Version {
            found: version,
            found_hash: hash,
            expected_hash,
        });
    }

    if !names.iter().map(String::as_str).eq(FEATURE_LAYOUT) {
        return Err(LayoutMismatchError::Names {
            found: names.to_vec(),
        });
    }

    Ok(())
}

/// Owned copy of the names, as stored in artifacts
pub fn feature_names() -> Vec<String> {
    FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(FEATURE_LAYOUT[i], feature.name());
        }
        assert_eq!(Feature::from_index(2), Some(Feature::Power));
        assert_eq!(Feature::from_index(3), None);
    }

    #[test]
    fn test_stamp_accepted() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash(), &feature_names()).is_ok());
    }

    #[test]
    fn test_stale_stamp_rejected() {
        let err = validate_layout(FEATURE_VERSION + 1, layout_hash(), &feature_names()).unwrap_err();
        assert!(matches!(err, LayoutMismatchError::Version { found, .. } if found == FEATURE_VERSION + 1));

        assert!(validate_layout(FEATURE_VERSION, !layout_hash(), &feature_names()).is_err());
    }

    #[test]
    fn test_reordered_names_rejected() {
        let names = vec!["power".to_string(), "voltage".to_string(), "current".to_string()];
        let err = validate_layout(FEATURE_VERSION, layout_hash(), &names).unwrap_err();
        assert_eq!(err, LayoutMismatchError::Names { found: names });
    }
}
